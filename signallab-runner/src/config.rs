//! Serializable backtest configuration.
//!
//! A run is described by a small TOML file:
//!
//! ```toml
//! [backtest]
//! symbol = "2267.T"
//! data_path = "data/japan_stock_2267.T.csv"
//! initial_cash = 1000000.0
//!
//! [strategy]
//! type = "ma_crossover"
//! short_window = 5
//! long_window = 25
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use signallab_core::strategy::{Strategy, StrategyError};

use crate::advisor::AdvisorConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Initial cash when the config does not set one.
pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid strategy: {0}")]
    Strategy(#[from] StrategyError),

    #[error("initial_cash must be positive and finite, got {0}")]
    InvalidCash(f64),

    #[error("start_date {start} is after end_date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("data_path is required unless synthetic = true")]
    MissingDataPath,
}

fn default_initial_cash() -> f64 {
    DEFAULT_INITIAL_CASH
}

/// `[backtest]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Use the synthetic random walk instead of a CSV file.
    #[serde(default)]
    pub synthetic: bool,
}

/// Complete configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor: Option<AdvisorConfig>,
}

/// The fields that decide a run's outcome; hashed into its [`RunId`].
#[derive(Serialize)]
struct RunIdentity<'a> {
    symbol: &'a str,
    strategy: &'a Strategy,
    initial_cash: f64,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    synthetic: bool,
}

impl BacktestConfig {
    pub fn new(symbol: impl Into<String>, strategy: impl Into<Strategy>) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.into(),
                data_path: None,
                initial_cash: DEFAULT_INITIAL_CASH,
                start_date: None,
                end_date: None,
                synthetic: false,
            },
            strategy: strategy.into(),
            advisor: None,
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backtest;
        if !(b.initial_cash.is_finite() && b.initial_cash > 0.0) {
            return Err(ConfigError::InvalidCash(b.initial_cash));
        }
        if let (Some(start), Some(end)) = (b.start_date, b.end_date) {
            if start > end {
                return Err(ConfigError::InvalidRange { start, end });
            }
        }
        if !b.synthetic && b.data_path.is_none() {
            return Err(ConfigError::MissingDataPath);
        }
        self.strategy.validate()?;
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// The data path and advisor settings are excluded: the same run over a
    /// relocated file keeps its id.
    pub fn run_id(&self) -> RunId {
        let identity = RunIdentity {
            symbol: &self.backtest.symbol,
            strategy: &self.strategy,
            initial_cash: self.backtest.initial_cash,
            start_date: self.backtest.start_date,
            end_date: self.backtest.end_date,
            synthetic: self.backtest.synthetic,
        };
        let json = serde_json::to_string(&identity).expect("RunIdentity serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
