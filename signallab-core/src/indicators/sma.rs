//! Simple Moving Average (SMA).
//!
//! Trailing mean over a lookback window. First valid value at index
//! period-1. A window containing any missing value yields `None`.

/// Rolling mean over an arbitrary series. A zero period yields an
/// all-missing series.
///
/// The window sum only accumulates present values; a separate counter tracks
/// how many missing values sit inside the window.
pub fn sma_of_series(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if period == 0 || n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut missing_in_window = 0usize;

    for i in 0..n {
        match values[i] {
            Some(v) => sum += v,
            None => missing_in_window += 1,
        }

        if i >= period {
            match values[i - period] {
                Some(v) => sum -= v,
                None => missing_in_window -= 1,
            }
        }

        if i + 1 >= period && missing_in_window == 0 {
            result[i] = Some(sum / period as f64);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, present, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = sma_of_series(&present(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]), 5);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_none(), "expected None at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let result = sma_of_series(&present(&[100.0, 200.0, 300.0]), 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_missing_propagation() {
        let mut values = present(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        values[2] = None;
        let result = sma_of_series(&values, 3);
        // Windows [10,11,_], [11,_,13], [_,13,14] are all missing.
        assert!(result[2].is_none());
        assert!(result[3].is_none());
        assert!(result[4].is_none());
        // [13,14,15] is clean again.
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_too_few_values() {
        let result = sma_of_series(&present(&[10.0, 11.0]), 5);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn sma_of_empty_series() {
        assert!(sma_of_series(&[], 3).is_empty());
        assert!(sma_of_series(&[], 0).is_empty());
    }

    #[test]
    fn sma_zero_period_is_all_missing() {
        let result = sma_of_series(&[Some(1.0), Some(2.0)], 0);
        assert_eq!(result, vec![None, None]);
    }
}
