//! Synthetic price source — deterministic random walk for offline runs.
//!
//! The RNG is seeded from BLAKE3(symbol), so the same symbol and date range
//! always yield the same bars. Weekends are skipped.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataOrigin, DateRange, PriceSource};
use crate::domain::{Bar, PriceSeries};

/// Starting price of every synthetic walk.
pub const SYNTHETIC_START_PRICE: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    default_start: NaiveDate,
    default_end: NaiveDate,
}

impl SyntheticSource {
    /// Open bounds passed to [`PriceSource::load`] fall back to these dates.
    pub fn new(default_start: NaiveDate, default_end: NaiveDate) -> Self {
        Self {
            default_start,
            default_end,
        }
    }

    pub fn generate(symbol: &str, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = SYNTHETIC_START_PRICE;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64) as f64;

            bars.push(Bar {
                index: bars.len(),
                date: current,
                open: Some(open),
                high: Some(high),
                low: Some(low),
                close: Some(close),
                volume: Some(volume),
            });

            price = close;
            current += Duration::days(1);
        }

        PriceSeries::new(symbol, bars)
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid calendar date"),
            NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid calendar date"),
        )
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::Synthetic
    }

    fn load(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, DataError> {
        let start = start.unwrap_or(self.default_start);
        let end = end.unwrap_or(self.default_end);
        DateRange::new(Some(start), Some(end))?;
        Ok(Self::generate(symbol, start, end))
    }
}
