//! Parameter sweep — grid search over strategy parameters.
//!
//! Every grid point runs the full pipeline against one shared, immutable
//! series. Points run in parallel with rayon; the output order depends only
//! on the rank metric and the strategy label, never on scheduling.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use signallab_core::analytics::PerformanceReport;
use signallab_core::domain::PriceSeries;
use signallab_core::strategy::{MaCrossover, MacdCrossover, RsiThreshold, Strategy};

use crate::data_loader::compute_dataset_hash;
use crate::runner::{run_pipeline, BacktestResult};

/// Parameter grid specification.
///
/// Each family is swept independently; an empty list skips that family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    /// MA crossover short windows to test
    #[serde(default)]
    pub ma_short_windows: Vec<usize>,
    /// MA crossover long windows to test
    #[serde(default)]
    pub ma_long_windows: Vec<usize>,
    /// RSI periods to test (30/70 thresholds)
    #[serde(default)]
    pub rsi_periods: Vec<usize>,
    /// MACD (short, long, signal) triples to test
    #[serde(default)]
    pub macd_params: Vec<(usize, usize, usize)>,
}

impl ParamGrid {
    /// A small MA crossover grid around the 5/25 reference run.
    ///
    /// Short windows: 5, 10, 20
    /// Long windows: 25, 50, 100
    pub fn ma_crossover_default() -> Self {
        Self {
            ma_short_windows: vec![5, 10, 20],
            ma_long_windows: vec![25, 50, 100],
            ..Self::default()
        }
    }

    /// Upper bound on the number of strategies (before invalid combos are skipped).
    pub fn size(&self) -> usize {
        self.ma_short_windows.len() * self.ma_long_windows.len()
            + self.rsi_periods.len()
            + self.macd_params.len()
    }

    /// Generates all valid strategies in the grid.
    pub fn strategies(&self) -> Vec<Strategy> {
        let mut out: Vec<Strategy> = Vec::new();

        for &short in &self.ma_short_windows {
            for &long in &self.ma_long_windows {
                // Skip invalid combinations (short >= long)
                if short >= long {
                    continue;
                }
                out.push(MaCrossover::new(short, long).into());
            }
        }
        for &period in &self.rsi_periods {
            out.push(RsiThreshold::new(period).into());
        }
        for &(short, long, signal) in &self.macd_params {
            if short >= long {
                continue;
            }
            out.push(MacdCrossover::new(short, long, signal).into());
        }

        out.retain(|s| s.validate().is_ok());
        out
    }
}

/// Metric used to order sweep results (higher is better).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    #[default]
    Sharpe,
    CumulativeReturn,
    ProfitFactor,
    WinRate,
}

impl RankMetric {
    pub fn value(self, report: &PerformanceReport) -> f64 {
        match self {
            RankMetric::Sharpe => report.sharpe_ratio,
            RankMetric::CumulativeReturn => report.cumulative_return,
            RankMetric::ProfitFactor => report.profit_factor,
            RankMetric::WinRate => report.win_rate,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankMetric::Sharpe => "sharpe",
            RankMetric::CumulativeReturn => "cumulative_return",
            RankMetric::ProfitFactor => "profit_factor",
            RankMetric::WinRate => "win_rate",
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sharpe" | "sharpe_ratio" => Ok(RankMetric::Sharpe),
            "cumulative_return" | "return" => Ok(RankMetric::CumulativeReturn),
            "profit_factor" => Ok(RankMetric::ProfitFactor),
            "win_rate" => Ok(RankMetric::WinRate),
            other => Err(format!("unknown rank metric '{other}'")),
        }
    }
}

/// One ranked sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub rank: usize,
    pub label: String,
    pub score: f64,
    pub result: BacktestResult,
}

/// Ranked results of a sweep, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    pub metric: RankMetric,
    pub symbol: String,
    pub dataset_hash: String,
    pub entries: Vec<SweepEntry>,
}

impl SweepResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&SweepEntry> {
        self.entries.first()
    }

    pub fn top(&self, n: usize) -> &[SweepEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

/// NaN sorts last; otherwise descending by score, then ascending by label.
fn rank_order(a: (f64, &str), b: (f64, &str)) -> Ordering {
    let key = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
    key(b.0)
        .total_cmp(&key(a.0))
        .then_with(|| a.1.cmp(b.1))
}

/// Run every strategy in `grid` over `series` in parallel and rank the results.
pub fn run_sweep(
    series: &PriceSeries,
    grid: &ParamGrid,
    initial_cash: f64,
    metric: RankMetric,
) -> SweepResults {
    let strategies = grid.strategies();
    info!(
        symbol = series.symbol(),
        points = strategies.len(),
        metric = %metric,
        "starting sweep"
    );

    let mut scored: Vec<(f64, String, BacktestResult)> = strategies
        .par_iter()
        .map(|strategy| {
            let result = run_pipeline(series, strategy, initial_cash);
            let score = metric.value(&result.report);
            debug!(strategy = %strategy.label(), score, "sweep point done");
            (score, strategy.label(), result)
        })
        .collect();

    scored.sort_by(|a, b| rank_order((a.0, &a.1), (b.0, &b.1)));

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(i, (score, label, result))| SweepEntry {
            rank: i + 1,
            label,
            score,
            result,
        })
        .collect();

    SweepResults {
        metric,
        symbol: series.symbol().to_string(),
        dataset_hash: compute_dataset_hash(series),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use signallab_core::data::SyntheticSource;

    fn series() -> PriceSeries {
        SyntheticSource::generate(
            "SWEEP",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        )
    }

    #[test]
    fn grid_skips_invalid_combos() {
        let grid = ParamGrid {
            ma_short_windows: vec![5, 30],
            ma_long_windows: vec![25, 50],
            rsi_periods: vec![0, 14],
            macd_params: vec![(12, 26, 9), (26, 12, 9), (12, 26, 0)],
        };
        let labels: Vec<String> = grid.strategies().iter().map(Strategy::label).collect();
        assert_eq!(
            labels,
            vec![
                "ma_crossover(5,25)",
                "ma_crossover(5,50)",
                "ma_crossover(30,50)",
                "rsi_threshold(14,30,70)",
                "macd_crossover(12,26,9)",
            ]
        );
        assert_eq!(grid.size(), 9);
    }

    #[test]
    fn results_are_ranked_descending() {
        let results = run_sweep(
            &series(),
            &ParamGrid::ma_crossover_default(),
            1_000_000.0,
            RankMetric::CumulativeReturn,
        );
        assert_eq!(results.len(), 9);
        for pair in results.entries.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(results.entries[0].rank, 1);
        assert_eq!(results.top(3).len(), 3);
        assert_eq!(results.top(100).len(), 9);
    }

    #[test]
    fn sweep_is_deterministic() {
        let grid = ParamGrid {
            rsi_periods: vec![7, 14, 21],
            macd_params: vec![(12, 26, 9), (5, 35, 5)],
            ..ParamGrid::ma_crossover_default()
        };
        let a = run_sweep(&series(), &grid, 1000.0, RankMetric::Sharpe);
        let b = run_sweep(&series(), &grid, 1000.0, RankMetric::Sharpe);
        let labels = |r: &SweepResults| r.entries.iter().map(|e| e.label.clone()).collect::<Vec<_>>();
        assert_eq!(labels(&a), labels(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn ties_break_by_label() {
        let mut v = vec![(1.0, "b"), (f64::NAN, "a"), (1.0, "a"), (2.0, "z")];
        v.sort_by(|a, b| rank_order(*a, *b));
        let labels: Vec<_> = v.iter().map(|(_, l)| *l).collect();
        assert_eq!(labels, vec!["z", "a", "b", "a"]);
        assert!(v[3].0.is_nan());
    }

    #[test]
    fn rank_metric_parses() {
        assert_eq!("sharpe".parse::<RankMetric>(), Ok(RankMetric::Sharpe));
        assert_eq!(
            "Profit_Factor".parse::<RankMetric>(),
            Ok(RankMetric::ProfitFactor)
        );
        assert!("calmar".parse::<RankMetric>().is_err());
    }
}
