//! RSI threshold — long when oversold, short when overbought.
//!
//! Signal = 1 when RSI < buy_threshold, -1 when RSI > sell_threshold, else 0.
//! Missing RSI (warm-up, flat prices, missing closes) reads as 0.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{require_window, SignalTable, StrategyError};
use crate::domain::PriceSeries;
use crate::indicators::rsi_of_series;

fn default_buy_threshold() -> f64 {
    30.0
}

fn default_sell_threshold() -> f64 {
    70.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiThreshold {
    pub period: usize,
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: f64,
    #[serde(default = "default_sell_threshold")]
    pub sell_threshold: f64,
}

impl RsiThreshold {
    /// RSI strategy with the conventional 30/70 thresholds.
    pub fn new(period: usize) -> Self {
        Self::with_thresholds(period, default_buy_threshold(), default_sell_threshold())
    }

    pub fn with_thresholds(period: usize, buy_threshold: f64, sell_threshold: f64) -> Self {
        Self {
            period,
            buy_threshold,
            sell_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        require_window("rsi_threshold", "period", self.period)?;
        if self.buy_threshold.partial_cmp(&self.sell_threshold) != Some(Ordering::Less) {
            return Err(StrategyError::InvalidThresholds {
                buy: self.buy_threshold,
                sell: self.sell_threshold,
            });
        }
        Ok(())
    }

    pub fn warmup_bars(&self) -> usize {
        self.period
    }

    pub fn compute(&self, series: &PriceSeries) -> SignalTable {
        let rsi = rsi_of_series(&series.closes(), self.period);

        let signals = rsi
            .iter()
            .map(|value| match value {
                Some(v) if *v < self.buy_threshold => 1,
                Some(v) if *v > self.sell_threshold => -1,
                _ => 0,
            })
            .collect();

        SignalTable::build(series, &["rsi"], vec![rsi], signals)
    }
}

impl Default for RsiThreshold {
    fn default() -> Self {
        Self::new(14)
    }
}
