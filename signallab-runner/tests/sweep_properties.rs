//! Property tests for sweep ranking.
//!
//! The ranking depends only on the set of grid points, never on the order
//! they are listed in or on which rayon worker finishes first.

use chrono::NaiveDate;
use proptest::prelude::*;
use signallab_core::domain::PriceSeries;
use signallab_runner::sweep::{run_sweep, ParamGrid, RankMetric, SweepResults};

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 30..150)
        .prop_map(|v| v.into_iter().map(|p| (p * 100.0).round() / 100.0).collect())
}

fn arb_metric() -> impl Strategy<Value = RankMetric> {
    prop_oneof![
        Just(RankMetric::Sharpe),
        Just(RankMetric::CumulativeReturn),
        Just(RankMetric::ProfitFactor),
        Just(RankMetric::WinRate),
    ]
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes("PROP", NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), closes)
}

fn ranking(results: &SweepResults) -> Vec<(usize, String, u64)> {
    results
        .entries
        .iter()
        .map(|e| (e.rank, e.label.clone(), e.score.to_bits()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn ranking_ignores_grid_order(
        closes in arb_closes(),
        metric in arb_metric(),
        shorts in Just(vec![2usize, 3, 5, 8]).prop_shuffle(),
        longs in Just(vec![10usize, 20, 30]).prop_shuffle(),
        rsi in Just(vec![5usize, 9, 14]).prop_shuffle(),
        macd in Just(vec![(3usize, 6usize, 3usize), (5, 13, 4), (12, 26, 9)]).prop_shuffle(),
    ) {
        let s = series(&closes);
        let canonical = ParamGrid {
            ma_short_windows: vec![2, 3, 5, 8],
            ma_long_windows: vec![10, 20, 30],
            rsi_periods: vec![5, 9, 14],
            macd_params: vec![(3, 6, 3), (5, 13, 4), (12, 26, 9)],
        };
        let shuffled = ParamGrid {
            ma_short_windows: shorts,
            ma_long_windows: longs,
            rsi_periods: rsi,
            macd_params: macd,
        };

        let expected = run_sweep(&s, &canonical, 10_000.0, metric);
        let actual = run_sweep(&s, &shuffled, 10_000.0, metric);

        prop_assert_eq!(expected.len(), canonical.size());
        prop_assert_eq!(ranking(&actual), ranking(&expected));
        prop_assert_eq!(actual.dataset_hash, expected.dataset_hash);
    }
}
