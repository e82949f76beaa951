//! Integration tests for signal strategies over realistic series.

use chrono::NaiveDate;
use signallab_core::data::SyntheticSource;
use signallab_core::domain::PriceSeries;
use signallab_core::strategy::{MaCrossover, MacdCrossover, RsiThreshold, Strategy};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn synthetic() -> PriceSeries {
    SyntheticSource::generate(
        "2267.T",
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
    )
}

/// V-shaped prices: 30 bars down, 30 bars up.
fn v_shape() -> PriceSeries {
    let mut closes: Vec<f64> = (0..30).map(|i| 130.0 - i as f64).collect();
    closes.extend((0..30).map(|i| 101.0 + 2.0 * i as f64));
    PriceSeries::from_closes("V", start(), &closes)
}

#[test]
fn every_strategy_emits_one_row_per_bar() {
    let series = synthetic();
    let strategies: Vec<Strategy> = vec![
        MaCrossover::new(5, 25).into(),
        RsiThreshold::new(14).into(),
        MacdCrossover::default().into(),
    ];
    for strategy in strategies {
        let table = strategy.compute_signals(&series);
        assert_eq!(table.len(), series.len(), "{}", strategy.label());
        assert_eq!(table.transitions()[0], 0);
        for (row, bar) in table.rows.iter().zip(series.bars()) {
            assert_eq!(row.index, bar.index);
            assert_eq!(row.close, bar.close);
        }
    }
}

#[test]
fn ma_crossover_buys_after_the_bottom() {
    let table = MaCrossover::new(3, 10).compute(&v_shape());
    let transitions = table.transitions();
    let buy = transitions.iter().position(|&t| t == 1).unwrap();
    assert!(buy > 30, "golden cross at {buy} should follow the bottom");
    assert!(transitions.iter().all(|&t| t >= 0));
}

#[test]
fn rsi_goes_long_on_the_way_down_and_short_on_the_way_up() {
    let table = RsiThreshold::new(5).compute(&v_shape());
    let signals = table.signals();
    assert_eq!(signals[10], 1);
    assert_eq!(signals[50], -1);
}

#[test]
fn macd_flips_after_the_bottom() {
    let table = MacdCrossover::new(3, 8, 3).compute(&v_shape());
    let signals = table.signals();
    assert_eq!(signals[20], -1);
    assert_eq!(signals[59], 1);
}

#[test]
fn strategies_do_not_mutate_the_series() {
    let series = synthetic();
    let before = series.clone();
    let _ = Strategy::from(MacdCrossover::default()).compute_signals(&series);
    let _ = Strategy::from(MaCrossover::new(5, 25)).compute_signals(&series);
    assert_eq!(series, before);
}

#[test]
fn empty_series_gives_empty_table() {
    let series = PriceSeries::empty("NONE");
    for strategy in [
        Strategy::from(MaCrossover::new(5, 25)),
        Strategy::from(RsiThreshold::new(14)),
        Strategy::from(MacdCrossover::default()),
    ] {
        assert!(strategy.compute_signals(&series).is_empty());
    }
}

#[test]
fn strategy_deserializes_from_toml_style_json() {
    let strategy: Strategy =
        serde_json::from_str(r#"{"type":"ma_crossover","short_window":5,"long_window":25}"#)
            .unwrap();
    assert_eq!(strategy, Strategy::from(MaCrossover::new(5, 25)));
    assert_eq!(strategy.warmup_bars(), 24);
}
