//! CSV price source.
//!
//! Reads a header-row CSV of daily bars. Header names are matched
//! case-insensitively; `date` and `close` are required, `open`, `high`, `low`
//! and `volume` are optional, anything else (`Adj Close`, `Ticker`) is ignored.
//! Rows whose date cell does not parse are dropped, which absorbs the ticker
//! and sub-header lines some downloaders write under the header.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use super::provider::{DataError, DataOrigin, DateRange, PriceSource};
use crate::domain::{coerce_number, Bar, PriceSeries};

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            date: find("date").ok_or(DataError::MissingColumn { column: "date" })?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: find("close").ok_or(DataError::MissingColumn { column: "close" })?,
            volume: find("volume"),
        })
    }
}

/// Parse `YYYY-MM-DD`, ignoring a trailing time part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse bars from any reader. Output is sorted by date, filtered to
    /// `range`, and holds one bar per date (the last row wins).
    pub fn parse_reader<R: Read>(
        symbol: &str,
        reader: R,
        range: DateRange,
    ) -> Result<PriceSeries, DataError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let cols = Columns::resolve(rdr.headers()?)?;
        let cell = |record: &StringRecord, col: Option<usize>| {
            col.and_then(|c| record.get(c)).and_then(coerce_number)
        };

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for record in rdr.records() {
            let record = record?;
            let Some(date) = record.get(cols.date).and_then(parse_date) else {
                skipped += 1;
                continue;
            };
            if !range.contains(date) {
                continue;
            }
            bars.push(Bar {
                index: 0,
                date,
                open: cell(&record, cols.open),
                high: cell(&record, cols.high),
                low: cell(&record, cols.low),
                close: cell(&record, Some(cols.close)),
                volume: cell(&record, cols.volume),
            });
        }
        if skipped > 0 {
            debug!(symbol, skipped, "dropped rows without a parseable date");
        }

        Ok(PriceSeries::new(symbol, dedup_sorted(symbol, bars)))
    }
}

/// Stable sort by date, then collapse equal dates keeping the later row.
fn dedup_sorted(symbol: &str, mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.date == bar.date => {
                warn!(symbol, date = %bar.date, "duplicate date, keeping last row");
                *prev = bar;
            }
            _ => out.push(bar),
        }
    }
    out
}

impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::Csv
    }

    fn load(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, DataError> {
        let range = DateRange::new(start, end)?;
        let file = File::open(&self.path).map_err(|source| DataError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let series = Self::parse_reader(symbol, file, range)?;
        debug!(
            symbol,
            path = %self.path.display(),
            bars = series.len(),
            "loaded csv"
        );
        Ok(series)
    }
}
