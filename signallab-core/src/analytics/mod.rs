//! Performance analytics — trade log → round trips → report.

pub mod metrics;
pub mod round_trips;

pub use metrics::{MetricUnit, PerformanceReport, METRIC_KEYS};
pub use round_trips::{RoundTrip, RoundTrips};
