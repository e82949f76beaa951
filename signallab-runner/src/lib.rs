//! SignalLab Runner — backtest orchestration, sweeps, export, advisory client.
//!
//! This crate builds on `signallab-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - Data loading from CSV or the synthetic walk
//! - Single-backtest runner (signals → simulator → round trips → report)
//! - Parallel parameter sweeps with deterministic ranking
//! - JSON/CSV artifact export
//! - An optional advisory client for strategy suggestions

pub mod advisor;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use advisor::{
    request_advice, Advisor, AdvisorConfig, AdvisorError, AdvisoryRequest, OpenAiAdvisor,
};
pub use config::{BacktestConfig, BacktestSection, ConfigError, RunId};
pub use data_loader::{load_from, load_series, LoadError, LoadedSeries};
pub use export::{export_json, import_json, load_artifacts, save_artifacts};
pub use runner::{run_pipeline, run_single_backtest, BacktestResult, RunError};
pub use sweep::{run_sweep, ParamGrid, RankMetric, SweepEntry, SweepResults};
