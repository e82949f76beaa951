//! Series loading for the runner.
//!
//! Resolves the `[backtest]` section to a price source:
//! 1. `synthetic = true` → deterministic random walk (tagged)
//! 2. `data_path` set → CSV file
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only mode. Results produced on it carry
//! `has_synthetic = true`.

use thiserror::Error;
use tracing::{debug, warn};

use signallab_core::data::{CsvSource, DataError, DataOrigin, PriceSource, SyntheticSource};
use signallab_core::domain::PriceSeries;

use crate::config::BacktestSection;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source for '{symbol}' (set data_path or use --synthetic)")]
    NoDataSource { symbol: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// A loaded series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    pub origin: DataOrigin,
    /// BLAKE3 over every bar; see [`compute_dataset_hash`].
    pub dataset_hash: String,
}

impl LoadedSeries {
    pub fn has_synthetic(&self) -> bool {
        self.origin.is_synthetic()
    }
}

/// Pick the price source described by a `[backtest]` section.
pub fn source_for(section: &BacktestSection) -> Result<Box<dyn PriceSource>, LoadError> {
    if section.synthetic {
        return Ok(Box::new(SyntheticSource::default()));
    }
    match &section.data_path {
        Some(path) => Ok(Box::new(CsvSource::new(path))),
        None => Err(LoadError::NoDataSource {
            symbol: section.symbol.clone(),
        }),
    }
}

/// Load the series for a `[backtest]` section.
pub fn load_series(section: &BacktestSection) -> Result<LoadedSeries, LoadError> {
    let source = source_for(section)?;
    load_from(
        source.as_ref(),
        &section.symbol,
        section.start_date,
        section.end_date,
    )
}

/// Load through an explicit source. Used by tests and the CLI's ad-hoc mode.
pub fn load_from(
    source: &dyn PriceSource,
    symbol: &str,
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> Result<LoadedSeries, LoadError> {
    let series = source.load(symbol, start, end)?;
    let origin = source.origin();

    if series.is_empty() {
        warn!(symbol, source = source.name(), "series is empty after filtering");
    }
    if origin.is_synthetic() {
        warn!(symbol, "using SYNTHETIC data; results are tagged and not comparable");
    }
    let voids = series.void_count();
    if voids > 0 {
        warn!(symbol, voids, "bars with missing close");
    }
    let suspects = series.suspect_count();
    if suspects > 0 {
        warn!(symbol, suspects, "bars failing the OHLC sanity check");
    }
    debug!(symbol, source = source.name(), bars = series.len(), "series loaded");

    let dataset_hash = compute_dataset_hash(&series);
    Ok(LoadedSeries {
        series,
        origin,
        dataset_hash,
    })
}

/// BLAKE3 over the symbol, each bar's date, and its OHLCV values.
///
/// A missing value hashes as a marker byte with no payload, so `None` never
/// collides with any number.
pub fn compute_dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());

    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        for value in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
            match value {
                Some(v) => {
                    hasher.update(&[1]);
                    hasher.update(&v.to_le_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn section(synthetic: bool) -> BacktestSection {
        BacktestSection {
            symbol: "SPY".into(),
            data_path: None,
            initial_cash: 1000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            synthetic,
        }
    }

    #[test]
    fn synthetic_is_tagged() {
        let loaded = load_series(&section(true)).unwrap();
        assert!(loaded.has_synthetic());
        assert_eq!(loaded.series.len(), 23);
    }

    #[test]
    fn missing_source_is_an_error() {
        let err = load_series(&section(false)).unwrap_err();
        assert!(matches!(err, LoadError::NoDataSource { .. }));
    }

    #[test]
    fn dataset_hash_deterministic_and_sensitive() {
        let loaded = load_series(&section(true)).unwrap();
        assert_eq!(
            compute_dataset_hash(&loaded.series),
            loaded.dataset_hash
        );

        let mut bars = loaded.series.bars().to_vec();
        bars[3].close = None;
        let altered = PriceSeries::new("SPY", bars);
        assert_ne!(compute_dataset_hash(&altered), loaded.dataset_hash);
    }

    #[test]
    fn dataset_hash_distinguishes_symbol() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let a = PriceSeries::from_closes("A", start, &[1.0, 2.0]);
        let b = PriceSeries::from_closes("B", start, &[1.0, 2.0]);
        assert_ne!(compute_dataset_hash(&a), compute_dataset_hash(&b));
    }
}
