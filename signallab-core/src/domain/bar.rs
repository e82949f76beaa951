//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single trading day.
///
/// Numeric fields are `None` when the source value was missing or not a
/// number. Missing values are carried through indicator math rather than
/// replaced, so downstream code decides what "missing" means for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Ordinal position in the owning series (0-based, strictly increasing).
    pub index: usize,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl Bar {
    /// A bar with every price field set to `close` and the given volume.
    pub fn from_close(index: usize, date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            index,
            date,
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// Returns true if the close is missing. Such a bar can never trade.
    pub fn is_void(&self) -> bool {
        self.close.is_none()
    }

    /// Basic OHLC sanity check: high >= low, high >= open/close, low <= open/close.
    ///
    /// Bars with any missing price field are not sane.
    pub fn is_sane(&self) -> bool {
        match (self.open, self.high, self.low, self.close) {
            (Some(open), Some(high), Some(low), Some(close)) => {
                high >= low
                    && high >= open
                    && high >= close
                    && low <= open
                    && low <= close
                    && open > 0.0
                    && close > 0.0
            }
            _ => false,
        }
    }
}

/// Coerce a raw numeric cell into the typed missing representation.
///
/// Anything that does not parse as a finite `f64` becomes `None`.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
