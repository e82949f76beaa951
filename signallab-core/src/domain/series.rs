//! PriceSeries — an ordered run of daily bars for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// Ordered OHLCV bars for a single symbol.
///
/// Construction re-indexes the bars `0..n` in the order given, so the
/// `index` of every bar always equals its position in the series. Callers
/// are responsible for passing bars in ascending date order; the data
/// sources in [`crate::data`] sort before building a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.index = i;
        }
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Build a series from close prices only, one calendar day apart.
    ///
    /// Used by tests, benches, and the sweep tooling.
    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = start + chrono::Duration::days(i as i64);
                Bar::from_close(i, date, close, 1000.0)
            })
            .collect();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close column with missing values preserved.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Number of bars whose close is missing.
    pub fn void_count(&self) -> usize {
        self.bars.iter().filter(|b| b.is_void()).count()
    }

    /// Number of present-close bars that fail the OHLC sanity check.
    pub fn suspect_count(&self) -> usize {
        self.bars
            .iter()
            .filter(|b| !b.is_void() && !b.is_sane())
            .count()
    }

    /// True when dates are strictly increasing.
    pub fn is_ordered(&self) -> bool {
        self.bars.windows(2).all(|w| w[0].date < w[1].date)
    }
}
