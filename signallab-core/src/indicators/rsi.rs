//! Relative Strength Index (RSI).
//!
//! Average gain and average loss are simple rolling means of the last
//! `period` close-to-close changes (not Wilder's exponential smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! The first bar has no change, so the first value sits at index `period`:
//! a full window of `period` real changes. The missing first change is not
//! counted as a zero gain.
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → missing.

use super::sma_of_series;

/// RSI over an arbitrary series of closes.
pub fn rsi_of_series(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut gains = vec![None; n];
    let mut losses = vec![None; n];
    for i in 1..n {
        if let (Some(curr), Some(prev)) = (values[i], values[i - 1]) {
            let change = curr - prev;
            gains[i] = Some(change.max(0.0));
            losses[i] = Some((-change).max(0.0));
        }
    }

    let avg_gain = sma_of_series(&gains, period);
    let avg_loss = sma_of_series(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| compute_rsi(g?, l?))
        .collect()
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        None
    } else if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, present};

    #[test]
    fn rsi_all_gains() {
        let result = rsi_of_series(&present(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]), 3);
        assert_approx(result[3], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let result = rsi_of_series(&present(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]), 3);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_first_value_needs_period_changes() {
        // period 3: index 2 has only two changes, index 3 has three.
        let result = rsi_of_series(&present(&[10.0, 9.0, 11.0, 12.0, 11.5]), 3);
        assert!(result[..3].iter().all(Option::is_none));
        // changes -1, +2, +1 → gain 1.0, loss 1/3
        assert_approx(result[3], 75.0, 1e-9);

        // period 1 is defined from the first change.
        let result = rsi_of_series(&present(&[10.0, 11.0]), 1);
        assert!(result[0].is_none());
        assert_approx(result[1], 100.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // Window at index 3: gains 0.34, losses 0.73
        // RSI = 100 - 100/(1 + 0.34/0.73)
        let result = rsi_of_series(&present(&[44.0, 44.34, 44.09, 43.61, 44.33]), 3);

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!(result[2].is_none());
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);

        // Window at index 4: changes -0.25, -0.48, +0.72 → gain 0.72, loss 0.73
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4], expected, 1e-9);
    }

    #[test]
    fn rsi_flat_prices_are_missing() {
        let result = rsi_of_series(&present(&[50.0, 50.0, 50.0, 50.0, 50.0]), 3);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        let result = rsi_of_series(&present(&closes), 3);
        for (i, v) in result.iter().enumerate() {
            if let Some(v) = v {
                assert!((0.0..=100.0).contains(v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_missing_close_blanks_windows_touching_it() {
        let mut values = present(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
        values[2] = None;
        let result = rsi_of_series(&values, 3);
        // Changes at 2 and 3 are missing; windows ending at 3, 4, 5 include them.
        assert!(result[3].is_none());
        assert!(result[4].is_none());
        assert!(result[5].is_none());
        assert_approx(result[6], 100.0, 1e-9);
    }

    #[test]
    fn rsi_of_empty_series() {
        assert!(rsi_of_series(&[], 14).is_empty());
    }
}
