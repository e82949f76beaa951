//! MACD crossover — long above the signal line, short below it.

use serde::{Deserialize, Serialize};

use super::{require_window, SignalTable, StrategyError};
use crate::domain::PriceSeries;
use crate::indicators::Macd;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdCrossover {
    #[serde(default = "default_short")]
    pub short_period: usize,
    #[serde(default = "default_long")]
    pub long_period: usize,
    #[serde(default = "default_signal")]
    pub signal_period: usize,
}

fn default_short() -> usize {
    12
}

fn default_long() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

impl MacdCrossover {
    pub fn new(short_period: usize, long_period: usize, signal_period: usize) -> Self {
        Self {
            short_period,
            long_period,
            signal_period,
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        require_window("macd_crossover", "short_period", self.short_period)?;
        require_window("macd_crossover", "long_period", self.long_period)?;
        require_window("macd_crossover", "signal_period", self.signal_period)
    }

    /// EMAs are defined from the first bar, so there is no hard warm-up;
    /// the longest span is reported as the settling window.
    pub fn warmup_bars(&self) -> usize {
        self.short_period.max(self.long_period)
    }

    pub fn compute(&self, series: &PriceSeries) -> SignalTable {
        if self.validate().is_err() {
            let n = series.len();
            return SignalTable::build(
                series,
                &["macd", "signal_line"],
                vec![vec![None; n], vec![None; n]],
                vec![0; n],
            );
        }

        let out = Macd::new(self.short_period, self.long_period, self.signal_period)
            .compute_series(&series.closes());

        let signals = out
            .histogram()
            .into_iter()
            .map(|h| match h {
                Some(h) if h > 0.0 => 1,
                Some(h) if h < 0.0 => -1,
                _ => 0,
            })
            .collect();

        SignalTable::build(
            series,
            &["macd", "signal_line"],
            vec![out.macd, out.signal_line],
            signals,
        )
    }
}

impl Default for MacdCrossover {
    fn default() -> Self {
        Self::new(default_short(), default_long(), default_signal())
    }
}
