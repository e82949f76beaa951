//! Moving average crossover — long while the short SMA is above the long SMA.
//!
//! Signal = 1 when short SMA > long SMA, else 0. The comparison is only
//! evaluated from bar `short_window` onward; every earlier bar is forced to
//! 0 even if both averages happen to exist. Bars between `short_window` and
//! `long_window - 1` compare against a missing long SMA and therefore also
//! read 0.

use serde::{Deserialize, Serialize};

use super::{require_window, SignalTable, StrategyError};
use crate::domain::PriceSeries;
use crate::indicators::sma_of_series;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

impl MaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        require_window("ma_crossover", "short_window", self.short_window)?;
        require_window("ma_crossover", "long_window", self.long_window)
    }

    pub fn warmup_bars(&self) -> usize {
        self.short_window.max(self.long_window.saturating_sub(1))
    }

    pub fn compute(&self, series: &PriceSeries) -> SignalTable {
        let closes = series.closes();
        let short_sma = sma_of_series(&closes, self.short_window);
        let long_sma = sma_of_series(&closes, self.long_window);

        let signals = (0..series.len())
            .map(|i| {
                if i < self.short_window {
                    return 0;
                }
                match (short_sma[i], long_sma[i]) {
                    (Some(s), Some(l)) if s > l => 1,
                    _ => 0,
                }
            })
            .collect();

        SignalTable::build(
            series,
            &["short_sma", "long_sma"],
            vec![short_sma, long_sma],
            signals,
        )
    }
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(50, 300)
    }
}
