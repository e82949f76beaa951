//! Moving Average Convergence Divergence (MACD).
//!
//! MACD line = EMA(short) - EMA(long); signal line = EMA(MACD, signal).
//! All three EMAs are first-value seeded, so both lines are defined from
//! bar 0 onward wherever the close is present.

use super::ema_of_series;

/// MACD and signal line, aligned with the input bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdOutput {
    pub macd: Vec<Option<f64>>,
    pub signal_line: Vec<Option<f64>>,
}

impl MacdOutput {
    /// MACD minus signal line, where both are present.
    pub fn histogram(&self) -> Vec<Option<f64>> {
        self.macd
            .iter()
            .zip(&self.signal_line)
            .map(|(m, s)| Some((*m)? - (*s)?))
            .collect()
    }
}

/// MACD parameters. A zero period gives all-missing lines.
#[derive(Debug, Clone, Copy)]
pub struct Macd {
    short_period: usize,
    long_period: usize,
    signal_period: usize,
}

impl Macd {
    pub fn new(short_period: usize, long_period: usize, signal_period: usize) -> Self {
        Self {
            short_period,
            long_period,
            signal_period,
        }
    }

    pub fn compute_series(&self, closes: &[Option<f64>]) -> MacdOutput {
        let short = ema_of_series(closes, self.short_period);
        let long = ema_of_series(closes, self.long_period);

        let macd: Vec<Option<f64>> = short
            .iter()
            .zip(&long)
            .map(|(s, l)| Some((*s)? - (*l)?))
            .collect();
        let signal_line = ema_of_series(&macd, self.signal_period);

        MacdOutput { macd, signal_line }
    }
}
