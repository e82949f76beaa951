//! Indicator implementations over close prices.
//!
//! Indicators are pure functions over a `&[Option<f64>]` column, one output
//! per input. `None` marks both the warm-up window and any output that
//! touched a missing input. Composed indicators (MACD's signal line, RSI's
//! rolling means) reuse the same functions.
//!
//! No value at bar t may depend on data from bar t+1 or later.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::ema_of_series;
pub use macd::{Macd, MacdOutput};
pub use rsi::rsi_of_series;
pub use sma::sma_of_series;

/// Close column with every value present.
#[cfg(test)]
pub fn present(closes: &[f64]) -> Vec<Option<f64>> {
    closes.iter().copied().map(Some).collect()
}

/// Assert an indicator output is present and approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: Option<f64>, expected: f64, epsilon: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got None"));
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
