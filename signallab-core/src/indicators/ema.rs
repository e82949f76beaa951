//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(span+1).
//! Seed: EMA[0] = x[0] (no SMA seed, no bias adjustment).
//!
//! A missing input yields a missing output at that bar; the recursion then
//! resumes from the last valid state. Leading missing values delay the seed
//! to the first present value.

/// EMA over an arbitrary series. A zero span yields an all-missing series.
pub fn ema_of_series(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            let ema = match prev {
                None => x,
                Some(p) => alpha * x + (1.0 - alpha) * p,
            };
            prev = Some(ema);
            Some(ema)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, present, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_input() {
        let result = ema_of_series(&present(&[100.0, 200.0, 300.0]), 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed = first value
        // EMA = 10, 10.5, 11.25, 12.125, 13.0625
        let result = ema_of_series(&present(&[10.0, 11.0, 12.0, 13.0, 14.0]), 3);

        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0625, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_missing_input_is_missing_then_resumes() {
        let values = [Some(10.0), Some(11.0), None, Some(13.0)];
        let result = ema_of_series(&values, 3);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert!(result[2].is_none());
        // Resumes from 10.5: 0.5*13 + 0.5*10.5 = 11.75
        assert_approx(result[3], 11.75, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_leading_missing_delays_seed() {
        let values = [None, None, Some(20.0), Some(22.0)];
        let result = ema_of_series(&values, 3);
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert_approx(result[2], 20.0, DEFAULT_EPSILON);
        assert_approx(result[3], 21.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_zero_span_is_all_missing() {
        assert_eq!(ema_of_series(&present(&[1.0, 2.0]), 0), vec![None, None]);
    }

    #[test]
    fn ema_of_empty_series() {
        assert!(ema_of_series(&[], 12).is_empty());
    }
}
