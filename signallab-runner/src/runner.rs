//! Backtest runner — wires together strategy, simulator, and analytics.
//!
//! Two entry points:
//! - `run_single_backtest()`: loads data per the config, then runs. Used by the CLI.
//! - `run_pipeline()`: takes a pre-loaded series. No I/O; used by sweeps and tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use signallab_core::analytics::{PerformanceReport, RoundTrips};
use signallab_core::domain::{PriceSeries, Trade};
use signallab_core::engine::{OpenPosition, Simulator};
use signallab_core::strategy::Strategy;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{compute_dataset_hash, load_series, LoadError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub symbol: String,
    pub strategy: Strategy,
    pub initial_cash: f64,
    /// Cash only; an open position at the end is not valued.
    pub final_cash: f64,
    pub open_position: Option<OpenPosition>,
    pub trades: Vec<Trade>,
    /// Per round trip: (exit − entry) / entry.
    pub returns: Vec<f64>,
    /// Per round trip: exit − entry.
    pub profits: Vec<f64>,
    pub report: PerformanceReport,
    pub bar_count: usize,
    pub warmup_bars: usize,
    /// Bars with a non-zero transition.
    pub signal_count: usize,
    /// Transition bars the simulator could not trade (missing or non-positive close).
    #[serde(default)]
    pub skipped_bars: Vec<usize>,
    pub start_date: String,
    pub end_date: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn strategy_label(&self) -> String {
        self.strategy.label()
    }

    /// Realized profit over closed round trips.
    pub fn realized_profit(&self) -> f64 {
        self.profits.iter().sum()
    }
}

/// Run a single backtest from a config (loads data per `[backtest]`).
///
/// This is the high-level entry point used by the CLI. For pre-loaded data,
/// use `run_pipeline()` instead.
pub fn run_single_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let loaded = load_series(&config.backtest)?;

    let mut result = run_pipeline(
        &loaded.series,
        &config.strategy,
        config.backtest.initial_cash,
    );
    result.run_id = Some(config.run_id());
    result.has_synthetic = loaded.has_synthetic();
    Ok(result)
}

/// Run the full pipeline over a pre-loaded series. No I/O.
///
/// signals → transitions → simulator → round trips → report.
pub fn run_pipeline(
    series: &PriceSeries,
    strategy: &Strategy,
    initial_cash: f64,
) -> BacktestResult {
    let label = strategy.label();

    let table = strategy.compute_signals(series);
    debug!(strategy = %label, rows = table.len(), transitions = table.transition_count(), "signals computed");

    let sim = Simulator::new(initial_cash).run_table(series, &table);
    debug!(strategy = %label, trades = sim.trade_log.len(), "simulation complete");

    let trips = RoundTrips::from_trade_log(&sim.trade_log);
    let returns = trips.returns();
    let profits = trips.profits();
    let report = PerformanceReport::compute(&returns, Some(&profits));

    info!(
        symbol = series.symbol(),
        strategy = %label,
        bars = series.len(),
        round_trips = trips.len(),
        final_cash = sim.final_cash,
        "backtest finished"
    );

    BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: None,
        symbol: series.symbol().to_string(),
        strategy: strategy.clone(),
        initial_cash,
        final_cash: sim.final_cash,
        open_position: sim.open_position,
        trades: sim.trade_log,
        returns,
        profits,
        report,
        bar_count: series.len(),
        warmup_bars: strategy.warmup_bars(),
        signal_count: table.transition_count(),
        skipped_bars: sim.skipped_bars,
        start_date: series.first_date().map(|d| d.to_string()).unwrap_or_default(),
        end_date: series.last_date().map(|d| d.to_string()).unwrap_or_default(),
        dataset_hash: compute_dataset_hash(series),
        has_synthetic: false,
    }
}
