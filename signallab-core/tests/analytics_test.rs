//! Integration tests for performance analytics.

use chrono::NaiveDate;
use signallab_core::analytics::{PerformanceReport, RoundTrips, METRIC_KEYS};
use signallab_core::domain::Trade;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-10,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn reference_three_trade_report() {
    let returns = [0.1, -0.05, 0.2];
    let profits = [1000.0, -500.0, 2000.0];
    let report = PerformanceReport::compute(&returns, Some(&profits));

    assert_eq!(report.trade_count, 3);
    assert_close(report.win_rate, 2.0 / 3.0);
    assert_close(report.profit_factor, 6.0);
    assert_close(report.cumulative_return, 1.1 * 0.95 * 1.2 - 1.0);
    assert_close(report.avg_win_pct, 0.15);
    assert_close(report.avg_loss_pct, -0.05);
    assert_close(report.payoff_ratio, 3.0);
    assert_close(report.expected_value_pct, 2.0 / 3.0 * 0.15 + 1.0 / 3.0 * -0.05);

    // Equity 1.1 → 1.045 → 1.254; deepest fall is from 1.1 to 1.045.
    assert!(report.max_drawdown <= 0.0);
    assert_close(report.max_drawdown, 1.045 / 1.1 - 1.0);

    assert_eq!(report.max_win_streak, 1);
    assert_eq!(report.max_loss_streak, 1);
}

#[test]
fn zero_returns_give_zero_sharpe() {
    let report = PerformanceReport::compute(&[0.0, 0.0, 0.0], None);
    assert_eq!(report.volatility, 0.0);
    assert_eq!(report.sharpe_ratio, 0.0);
    assert_eq!(report.win_rate, 0.0);
    assert_eq!(report.max_win_streak, 0);
    assert_eq!(report.max_loss_streak, 0);
}

#[test]
fn single_trade_has_zero_volatility() {
    let report = PerformanceReport::compute(&[0.05], None);
    assert_eq!(report.volatility, 0.0);
    assert_eq!(report.sharpe_ratio, 0.0);
    assert_close(report.annualized_return, 1.05_f64.powf(252.0) - 1.0);
}

#[test]
fn all_losers() {
    let report = PerformanceReport::compute(&[-0.1, -0.2], Some(&[-10.0, -20.0]));
    assert_eq!(report.profit_factor, 0.0);
    assert_eq!(report.payoff_ratio, 0.0);
    assert_eq!(report.avg_win_amount, Some(0.0));
    assert_close(report.avg_loss_amount.unwrap(), -15.0);
    assert_eq!(report.max_loss_streak, 2);
}

#[test]
fn infinite_ratios_serialize_as_null_and_read_back() {
    let report = PerformanceReport::compute(&[0.1, 0.2], None);
    assert!(report.profit_factor.is_infinite());

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"profit_factor\":null"));

    let back: PerformanceReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[test]
fn map_keys_are_stable() {
    let report = PerformanceReport::compute(&[0.1], Some(&[5.0]));
    let map = report.to_map();
    let mut expected: Vec<&str> = METRIC_KEYS.to_vec();
    expected.sort_unstable();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), expected);
}

#[test]
fn round_trips_feed_the_report() {
    let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let log = vec![
        Trade::buy(100.0, 0, d),
        Trade::sell(110.0, 5, d, 100.0),
        Trade::buy(110.0, 6, d),
        Trade::sell(99.0, 9, d, 110.0),
        Trade::buy(98.0, 12, d),
    ];
    let trips = RoundTrips::from_trade_log(&log);
    let report = PerformanceReport::compute(&trips.returns(), Some(&trips.profits()));

    assert_eq!(report.trade_count, 2);
    assert_close(report.win_rate, 0.5);
    assert_close(report.avg_win_amount.unwrap(), 10.0);
    assert_close(report.avg_loss_amount.unwrap(), -11.0);
    assert_close(report.profit_factor, 0.1 / 0.1);
}
