//! Performance metrics — pure functions over per-trade returns.
//!
//! Every metric takes the realized round-trip returns (and optionally the
//! matching currency profits) and produces a scalar. Undefined ratios resolve
//! to a sentinel (0 or +∞) instead of an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Canonical key order of a report.
pub const METRIC_KEYS: [&str; 18] = [
    "cumulative_return",
    "annualized_return",
    "volatility",
    "sharpe_ratio",
    "win_rate",
    "expected_value_pct",
    "expected_value_amount",
    "avg_win_pct",
    "avg_loss_pct",
    "avg_win_amount",
    "avg_loss_amount",
    "trade_count",
    "max_drawdown",
    "profit_factor",
    "payoff_ratio",
    "risk_reward_ratio",
    "max_win_streak",
    "max_loss_streak",
];

/// How a metric should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Fraction shown as a percentage with two decimals.
    Percent,
    /// Per-trade fraction shown as a percentage with four decimals.
    FinePercent,
    /// Currency amount with two decimals.
    Currency,
    Count,
    Ratio,
}

impl MetricUnit {
    pub fn of(key: &str) -> Self {
        match key {
            "cumulative_return" | "annualized_return" | "volatility" | "win_rate"
            | "max_drawdown" => Self::Percent,
            "expected_value_pct" | "avg_win_pct" | "avg_loss_pct" => Self::FinePercent,
            "expected_value_amount" | "avg_win_amount" | "avg_loss_amount" => Self::Currency,
            "trade_count" | "max_win_streak" | "max_loss_streak" => Self::Count,
            _ => Self::Ratio,
        }
    }

    pub fn format(self, value: f64) -> String {
        if !value.is_finite() {
            return if value.is_nan() {
                "NaN".into()
            } else if value > 0.0 {
                "inf".into()
            } else {
                "-inf".into()
            };
        }
        match self {
            Self::Percent => format!("{:.2}%", value * 100.0),
            Self::FinePercent => format!("{:.4}%", value * 100.0),
            Self::Currency => format!("{value:.2}"),
            Self::Count => format!("{value:.0}"),
            Self::Ratio => format!("{value:.4}"),
        }
    }
}

/// JSON has no infinity; serde_json writes it as `null`. The only non-finite
/// value a report produces is +∞, so read `null` back as that.
fn f64_or_infinity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

/// Aggregate statistics for one backtest's round trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(deserialize_with = "f64_or_infinity")]
    pub cumulative_return: f64,
    #[serde(deserialize_with = "f64_or_infinity")]
    pub annualized_return: f64,
    #[serde(deserialize_with = "f64_or_infinity")]
    pub volatility: f64,
    #[serde(deserialize_with = "f64_or_infinity")]
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    pub expected_value_pct: f64,
    pub expected_value_amount: Option<f64>,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub avg_win_amount: Option<f64>,
    pub avg_loss_amount: Option<f64>,
    pub trade_count: usize,
    pub max_drawdown: f64,
    #[serde(deserialize_with = "f64_or_infinity")]
    pub profit_factor: f64,
    #[serde(deserialize_with = "f64_or_infinity")]
    pub payoff_ratio: f64,
    #[serde(deserialize_with = "f64_or_infinity")]
    pub risk_reward_ratio: f64,
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
}

impl PerformanceReport {
    /// Compute every metric from per-trade `returns` and optional `profits`.
    ///
    /// An empty `returns` slice yields [`PerformanceReport::degenerate`].
    pub fn compute(returns: &[f64], profits: Option<&[f64]>) -> Self {
        if returns.is_empty() {
            return Self::degenerate(profits.is_some());
        }

        let win_rate = win_rate(returns);
        let avg_win = mean_where(returns, |r| r > 0.0);
        let avg_loss = mean_where(returns, |r| r < 0.0);
        let expected = expected_value(win_rate, avg_win, avg_loss);

        let (avg_win_amount, avg_loss_amount, expected_value_amount) = match profits {
            Some(p) => {
                let w = mean_where(p, |x| x > 0.0);
                let l = mean_where(p, |x| x < 0.0);
                (Some(w), Some(l), Some(expected_value(win_rate, w, l)))
            }
            None => (None, None, None),
        };

        let annualized = annualized_return(returns);
        let vol = volatility(returns);
        let (max_win_streak, max_loss_streak) = streaks(returns);

        Self {
            cumulative_return: cumulative_return(returns),
            annualized_return: annualized,
            volatility: vol,
            sharpe_ratio: sharpe_ratio(annualized, vol),
            win_rate,
            expected_value_pct: expected,
            expected_value_amount,
            avg_win_pct: avg_win,
            avg_loss_pct: avg_loss,
            avg_win_amount,
            avg_loss_amount,
            trade_count: returns.len(),
            max_drawdown: max_drawdown(returns),
            profit_factor: profit_factor(returns),
            payoff_ratio: sentinel_ratio(avg_win, avg_loss),
            risk_reward_ratio: sentinel_ratio(expected, avg_loss),
            max_win_streak,
            max_loss_streak,
        }
    }

    /// Report for zero round trips: every metric 0.
    pub fn degenerate(with_amounts: bool) -> Self {
        let amount = with_amounts.then_some(0.0);
        Self {
            cumulative_return: 0.0,
            annualized_return: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            win_rate: 0.0,
            expected_value_pct: 0.0,
            expected_value_amount: amount,
            avg_win_pct: 0.0,
            avg_loss_pct: 0.0,
            avg_win_amount: amount,
            avg_loss_amount: amount,
            trade_count: 0,
            max_drawdown: 0.0,
            profit_factor: 0.0,
            payoff_ratio: 0.0,
            risk_reward_ratio: 0.0,
            max_win_streak: 0,
            max_loss_streak: 0,
        }
    }

    /// Metrics in canonical key order. Currency fields are `None` when the
    /// report was computed without profits.
    pub fn entries(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("cumulative_return", Some(self.cumulative_return)),
            ("annualized_return", Some(self.annualized_return)),
            ("volatility", Some(self.volatility)),
            ("sharpe_ratio", Some(self.sharpe_ratio)),
            ("win_rate", Some(self.win_rate)),
            ("expected_value_pct", Some(self.expected_value_pct)),
            ("expected_value_amount", self.expected_value_amount),
            ("avg_win_pct", Some(self.avg_win_pct)),
            ("avg_loss_pct", Some(self.avg_loss_pct)),
            ("avg_win_amount", self.avg_win_amount),
            ("avg_loss_amount", self.avg_loss_amount),
            ("trade_count", Some(self.trade_count as f64)),
            ("max_drawdown", Some(self.max_drawdown)),
            ("profit_factor", Some(self.profit_factor)),
            ("payoff_ratio", Some(self.payoff_ratio)),
            ("risk_reward_ratio", Some(self.risk_reward_ratio)),
            ("max_win_streak", Some(self.max_win_streak as f64)),
            ("max_loss_streak", Some(self.max_loss_streak as f64)),
        ]
    }

    /// Flat key → value view. Absent currency fields are omitted.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        self.entries()
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v)
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Π(1 + r) − 1.
pub fn cumulative_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

/// (1 + cumulative)^(252 / n) − 1. Zero for an empty slice.
pub fn annualized_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let growth = 1.0 + cumulative_return(returns);
    growth.powf(PERIODS_PER_YEAR / returns.len() as f64) - 1.0
}

/// Sample standard deviation × √252. Zero when fewer than two returns.
pub fn volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * PERIODS_PER_YEAR.sqrt()
}

/// annualized / volatility, 0 when volatility is 0.
pub fn sharpe_ratio(annualized: f64, volatility: f64) -> f64 {
    if volatility == 0.0 {
        0.0
    } else {
        annualized / volatility
    }
}

pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().filter(|&&r| r > 0.0).count() as f64 / returns.len() as f64
}

pub fn expected_value(win_rate: f64, avg_win: f64, avg_loss: f64) -> f64 {
    win_rate * avg_win + (1.0 - win_rate) * avg_loss
}

/// Compounded equity path, starting after the first trade.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}

/// Deepest (equity − peak) / peak, as a non-positive fraction.
///
/// The running peak starts at the first equity point, so a loss on the very
/// first trade is not a drawdown.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let curve = equity_curve(returns);
    let Some(&first) = curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for eq in curve {
        if eq > peak {
            peak = eq;
        }
        if peak != 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

/// Σ positive returns / |Σ negative returns|; +∞ when nothing was lost.
pub fn profit_factor(returns: &[f64]) -> f64 {
    let gross_profit: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let gross_loss: f64 = returns.iter().filter(|&&r| r < 0.0).sum::<f64>().abs();
    if gross_loss == 0.0 {
        f64::INFINITY
    } else {
        gross_profit / gross_loss
    }
}

/// Longest runs of strictly positive and strictly negative values.
/// A zero breaks both runs.
pub fn streaks(returns: &[f64]) -> (usize, usize) {
    let (mut win, mut loss) = (0usize, 0usize);
    let (mut max_win, mut max_loss) = (0usize, 0usize);
    for &r in returns {
        if r > 0.0 {
            win += 1;
            loss = 0;
        } else if r < 0.0 {
            loss += 1;
            win = 0;
        } else {
            win = 0;
            loss = 0;
        }
        max_win = max_win.max(win);
        max_loss = max_loss.max(loss);
    }
    (max_win, max_loss)
}

fn sentinel_ratio(numerator: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        f64::INFINITY
    } else {
        numerator / avg_loss.abs()
    }
}

fn mean_where(values: &[f64], keep: impl Fn(f64) -> bool) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|&&v| keep(v))
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
