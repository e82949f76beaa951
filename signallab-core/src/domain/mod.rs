//! Domain types for SignalLab

pub mod bar;
pub mod series;
pub mod trade;

pub use bar::{coerce_number, Bar};
pub use series::PriceSeries;
pub use trade::{Trade, TradeSide};
