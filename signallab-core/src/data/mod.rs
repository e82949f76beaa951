//! Price data sources

pub mod csv_source;
pub mod provider;
pub mod synthetic;

pub use csv_source::{parse_date, CsvSource};
pub use provider::{DataError, DataOrigin, DateRange, PriceSource};
pub use synthetic::SyntheticSource;
