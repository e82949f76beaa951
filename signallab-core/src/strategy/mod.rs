//! Signal strategies — turn a price series into per-bar signals and transitions.
//!
//! Strategies are a closed set of variants behind [`Strategy`]. Each variant is
//! a pure function of the series and its own parameters: it never mutates the
//! input and never sees account state.
//!
//! The output is a [`SignalTable`] with one row per input bar. A row's
//! `transition` is the first difference of `signal`; it is always 0 at the
//! first bar and wherever the indicator is still warming up.

pub mod ma_crossover;
pub mod macd_crossover;
pub mod rsi_threshold;

pub use ma_crossover::MaCrossover;
pub use macd_crossover::MacdCrossover;
pub use rsi_threshold::RsiThreshold;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;

/// Invalid strategy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("{strategy}: {param} must be >= 1")]
    ZeroWindow {
        strategy: &'static str,
        param: &'static str,
    },

    #[error("rsi_threshold: buy_threshold ({buy}) must be below sell_threshold ({sell})")]
    InvalidThresholds { buy: f64, sell: f64 },
}

pub(crate) fn require_window(
    strategy: &'static str,
    param: &'static str,
    value: usize,
) -> Result<(), StrategyError> {
    if value == 0 {
        return Err(StrategyError::ZeroWindow { strategy, param });
    }
    Ok(())
}

/// A signal strategy. Dispatch is by `match`; there is no open extension point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    MaCrossover(MaCrossover),
    RsiThreshold(RsiThreshold),
    MacdCrossover(MacdCrossover),
}

impl Strategy {
    /// Compute the signal table for `series`.
    ///
    /// Parameters are not re-validated here; a zero window simply produces
    /// an all-zero signal.
    pub fn compute_signals(&self, series: &PriceSeries) -> SignalTable {
        match self {
            Strategy::MaCrossover(s) => s.compute(series),
            Strategy::RsiThreshold(s) => s.compute(series),
            Strategy::MacdCrossover(s) => s.compute(series),
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        match self {
            Strategy::MaCrossover(s) => s.validate(),
            Strategy::RsiThreshold(s) => s.validate(),
            Strategy::MacdCrossover(s) => s.validate(),
        }
    }

    /// Stable identifier of the variant (matches the serde tag).
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::MaCrossover(_) => "ma_crossover",
            Strategy::RsiThreshold(_) => "rsi_threshold",
            Strategy::MacdCrossover(_) => "macd_crossover",
        }
    }

    /// Human-readable label including parameters, e.g. `ma_crossover(5,25)`.
    pub fn label(&self) -> String {
        match self {
            Strategy::MaCrossover(s) => {
                format!("{}({},{})", self.name(), s.short_window, s.long_window)
            }
            Strategy::RsiThreshold(s) => format!(
                "{}({},{},{})",
                self.name(),
                s.period,
                s.buy_threshold,
                s.sell_threshold
            ),
            Strategy::MacdCrossover(s) => format!(
                "{}({},{},{})",
                self.name(),
                s.short_period,
                s.long_period,
                s.signal_period
            ),
        }
    }

    /// Number of leading bars for which the strategy cannot hold a view.
    pub fn warmup_bars(&self) -> usize {
        match self {
            Strategy::MaCrossover(s) => s.warmup_bars(),
            Strategy::RsiThreshold(s) => s.warmup_bars(),
            Strategy::MacdCrossover(s) => s.warmup_bars(),
        }
    }
}

impl From<MaCrossover> for Strategy {
    fn from(s: MaCrossover) -> Self {
        Strategy::MaCrossover(s)
    }
}

impl From<RsiThreshold> for Strategy {
    fn from(s: RsiThreshold) -> Self {
        Strategy::RsiThreshold(s)
    }
}

impl From<MacdCrossover> for Strategy {
    fn from(s: MacdCrossover) -> Self {
        Strategy::MacdCrossover(s)
    }
}

/// One bar of strategy output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub index: usize,
    pub date: NaiveDate,
    pub close: Option<f64>,
    /// Indicator values, ordered as [`SignalTable::columns`].
    pub indicators: Vec<Option<f64>>,
    /// Directional stance: 1 long, -1 short, 0 flat.
    pub signal: i8,
    /// Change in `signal` from the previous bar; 0 at the first bar.
    pub transition: i8,
}

/// Strategy output aligned one row per input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    pub columns: Vec<String>,
    pub rows: Vec<SignalRow>,
}

impl SignalTable {
    /// Assemble a table from a series, named indicator columns, and signals.
    ///
    /// `indicators` holds one full-length column per name.
    pub(crate) fn build(
        series: &PriceSeries,
        columns: &[&str],
        indicators: Vec<Vec<Option<f64>>>,
        signals: Vec<i8>,
    ) -> Self {
        debug_assert_eq!(columns.len(), indicators.len());
        debug_assert_eq!(signals.len(), series.len());

        let transitions = first_difference(&signals);
        let rows = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| SignalRow {
                index: bar.index,
                date: bar.date,
                close: bar.close,
                indicators: indicators.iter().map(|col| col[i]).collect(),
                signal: signals[i],
                transition: transitions[i],
            })
            .collect();

        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signals(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.signal).collect()
    }

    pub fn transitions(&self) -> Vec<i8> {
        self.rows.iter().map(|r| r.transition).collect()
    }

    /// Number of bars with a non-zero transition.
    pub fn transition_count(&self) -> usize {
        self.rows.iter().filter(|r| r.transition != 0).count()
    }

    /// Full column for a named indicator.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.indicators[pos]).collect())
    }
}

/// First difference of a signal sequence; the first element is 0.
pub fn first_difference(signals: &[i8]) -> Vec<i8> {
    let mut out = Vec::with_capacity(signals.len());
    for (i, &s) in signals.iter().enumerate() {
        if i == 0 {
            out.push(0);
        } else {
            out.push(s - signals[i - 1]);
        }
    }
    out
}
