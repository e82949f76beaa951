//! SignalLab Core — price series, indicators, signal strategies, simulator, analytics.
//!
//! This crate contains the signal-driven backtesting engine:
//! - Domain types (bars, price series, trades)
//! - Rolling indicators over close prices (SMA, EMA, RSI, MACD)
//! - Signal strategies producing per-bar signals and transitions
//! - A FLAT/LONG simulator that replays transitions into a trade log
//! - Performance analytics over realized round-trip returns
//! - CSV and synthetic price sources

pub mod analytics;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;
