//! SignalLab CLI — single backtests and parameter sweeps.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config or from flags
//! - `sweep` — grid-search strategy parameters over one series and rank them

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use signallab_core::analytics::MetricUnit;
use signallab_core::strategy::{MaCrossover, MacdCrossover, RsiThreshold, Strategy};
use signallab_runner::advisor::{Advisor, AdvisorConfig, AdvisoryRequest, OpenAiAdvisor};
use signallab_runner::config::{BacktestConfig, DEFAULT_INITIAL_CASH};
use signallab_runner::data_loader::load_series;
use signallab_runner::export::save_artifacts;
use signallab_runner::runner::{run_single_backtest, BacktestResult};
use signallab_runner::sweep::{run_sweep, ParamGrid, RankMetric, SweepResults};

/// Only the CLI looks at the environment; the library takes the key explicitly.
const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Parser)]
#[command(
    name = "signallab",
    about = "SignalLab CLI — signal-driven single-asset backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or from flags.
    Run(RunArgs),
    /// Run a parameter grid over one series and rank the results.
    Sweep(SweepArgs),
}

#[derive(Args)]
struct DataArgs {
    /// Price CSV with a Date/Close header.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Use the deterministic synthetic random walk instead of a CSV.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Symbol label for the series.
    #[arg(long, default_value = "SYNTH")]
    symbol: String,

    /// First date to include (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    #[arg(long, default_value_t = DEFAULT_INITIAL_CASH)]
    initial_cash: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyKind {
    Ma,
    Rsi,
    Macd,
}

#[derive(Args)]
struct RunArgs {
    /// Path to a TOML config file. Exclusive with --csv/--synthetic.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    data: DataArgs,

    #[arg(long, value_enum, default_value_t = StrategyKind::Ma)]
    strategy: StrategyKind,

    /// MA short window / MACD short period.
    #[arg(long)]
    short: Option<usize>,

    /// MA long window / MACD long period.
    #[arg(long)]
    long: Option<usize>,

    /// RSI period.
    #[arg(long, default_value_t = 14)]
    period: usize,

    #[arg(long, default_value_t = 30.0)]
    buy_threshold: f64,

    #[arg(long, default_value_t = 70.0)]
    sell_threshold: f64,

    /// MACD signal period.
    #[arg(long, default_value_t = 9)]
    signal: usize,

    /// Directory for result.json / trades.csv / report.csv.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Ask the advisory endpoint for parameter suggestions after the run.
    #[arg(long, default_value_t = false)]
    advise: bool,

    /// Advisor API key. Falls back to the config's [advisor] section, then OPENAI_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    /// Advisor model name.
    #[arg(long)]
    model: Option<String>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    data: DataArgs,

    /// MA short windows, comma separated.
    #[arg(long, value_delimiter = ',')]
    ma_short: Vec<usize>,

    /// MA long windows, comma separated.
    #[arg(long, value_delimiter = ',')]
    ma_long: Vec<usize>,

    /// RSI periods, comma separated.
    #[arg(long, value_delimiter = ',')]
    rsi: Vec<usize>,

    /// MACD triples as short:long:signal, comma separated.
    #[arg(long, value_delimiter = ',', value_parser = parse_macd)]
    macd: Vec<(usize, usize, usize)>,

    /// Ranking metric: sharpe, cumulative_return, profit_factor, win_rate.
    #[arg(long, default_value_t = RankMetric::Sharpe)]
    metric: RankMetric,

    /// Number of ranked results to print.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Write the full ranked results as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run_backtest_cmd(args),
        Commands::Sweep(args) => run_sweep_cmd(args),
    }
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => {
            if args.data.csv.is_some() || args.data.synthetic {
                bail!("--config is exclusive with --csv and --synthetic");
            }
            BacktestConfig::from_file(path)?
        }
        None => config_from_flags(&args.data, build_strategy(&args))?,
    };

    let result = run_single_backtest(&config)?;

    print_trades(&result);
    print_report(&result);

    if let Some(dir) = &args.output_dir {
        let run_dir = save_artifacts(&result, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    // The backtest already succeeded; advice is best-effort.
    if args.advise {
        match fetch_advice(&args, &config, &result) {
            Ok(text) => {
                println!();
                println!("=== Advisor ===");
                println!("{text}");
            }
            Err(e) => {
                let error = format!("{e:#}");
                warn!(%error, "advisory request failed");
                println!("No advice available (see log).");
            }
        }
    }

    Ok(())
}

fn run_sweep_cmd(args: SweepArgs) -> Result<()> {
    let strategy: Strategy = MaCrossover::default().into();
    let config = config_from_flags(&args.data, strategy)?;
    let loaded = load_series(&config.backtest)?;

    let mut grid = ParamGrid {
        ma_short_windows: args.ma_short,
        ma_long_windows: args.ma_long,
        rsi_periods: args.rsi,
        macd_params: args.macd,
    };
    if grid.size() == 0 {
        info!("empty grid; using the default MA crossover grid");
        grid = ParamGrid::ma_crossover_default();
    }

    let results = run_sweep(&loaded.series, &grid, config.backtest.initial_cash, args.metric);
    if loaded.has_synthetic() {
        println!("WARNING: Results based on SYNTHETIC data");
    }
    print_sweep(&results, args.top);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&results).context("failed to serialize sweep")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Sweep results saved to: {}", path.display());
    }
    Ok(())
}

fn build_strategy(args: &RunArgs) -> Strategy {
    match args.strategy {
        StrategyKind::Ma => {
            MaCrossover::new(args.short.unwrap_or(5), args.long.unwrap_or(25)).into()
        }
        StrategyKind::Rsi => {
            RsiThreshold::with_thresholds(args.period, args.buy_threshold, args.sell_threshold)
                .into()
        }
        StrategyKind::Macd => MacdCrossover::new(
            args.short.unwrap_or(12),
            args.long.unwrap_or(26),
            args.signal,
        )
        .into(),
    }
}

fn config_from_flags(data: &DataArgs, strategy: Strategy) -> Result<BacktestConfig> {
    if data.csv.is_none() && !data.synthetic {
        bail!("one of --config, --csv or --synthetic is required");
    }
    if data.csv.is_some() && data.synthetic {
        bail!("--csv and --synthetic are mutually exclusive");
    }

    let mut config = BacktestConfig::new(data.symbol.clone(), strategy);
    config.backtest.data_path = data.csv.clone();
    config.backtest.synthetic = data.synthetic;
    config.backtest.start_date = data.start;
    config.backtest.end_date = data.end;
    config.backtest.initial_cash = data.initial_cash;
    config.validate()?;
    Ok(config)
}

fn advisor_config(args: &RunArgs, config: &BacktestConfig) -> Result<AdvisorConfig> {
    let mut advisor = match (&args.api_key, &config.advisor) {
        (Some(key), _) => AdvisorConfig::new(key.clone()),
        (None, Some(section)) => section.clone(),
        (None, None) => match std::env::var(API_KEY_ENV) {
            Ok(key) => AdvisorConfig::new(key),
            Err(_) => bail!("--advise needs --api-key, an [advisor] section, or {API_KEY_ENV}"),
        },
    };
    if let Some(model) = &args.model {
        advisor.model_name = model.clone();
    }
    Ok(advisor)
}

fn fetch_advice(
    args: &RunArgs,
    config: &BacktestConfig,
    result: &BacktestResult,
) -> Result<String> {
    let advisor = OpenAiAdvisor::new(advisor_config(args, config)?)?;
    let request = AdvisoryRequest::from_result(result)?;
    let text = advisor
        .suggest(&request)
        .with_context(|| format!("{} advisor", advisor.name()))?;
    Ok(text)
}

fn parse_macd(s: &str) -> Result<(usize, usize, usize), String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [short, long, signal] = parts.as_slice() else {
        return Err(format!("expected short:long:signal, got '{s}'"));
    };
    let num = |p: &str| {
        p.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid period '{p}': {e}"))
    };
    Ok((num(*short)?, num(*long)?, num(*signal)?))
}

fn print_trades(result: &BacktestResult) {
    println!();
    println!("=== Trade History ===");
    if result.trades.is_empty() {
        println!("(no trades)");
    }
    for t in &result.trades {
        match t.profit {
            Some(profit) => println!(
                "{:<4} #{:<5} {}  price {:>12.2}  profit {:>12.2}",
                t.side.as_str(),
                t.index,
                t.date,
                t.price,
                profit
            ),
            None => println!(
                "{:<4} #{:<5} {}  price {:>12.2}",
                t.side.as_str(),
                t.index,
                t.date,
                t.price
            ),
        }
    }
    if let Some(open) = &result.open_position {
        println!(
            "Open position from bar {} at {:.2} (not valued)",
            open.entry_index, open.entry_price
        );
    }
}

fn print_report(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", result.symbol);
    println!("Strategy:       {}", result.strategy_label());
    println!("Period:         {} to {}", result.start_date, result.end_date);
    println!(
        "Bars:           {} ({} warmup)",
        result.bar_count, result.warmup_bars
    );
    println!("Signals:        {}", result.signal_count);
    println!("Initial Cash:   {:.2}", result.initial_cash);
    println!("Final Cash:     {:.2}", result.final_cash);
    if !result.skipped_bars.is_empty() {
        println!("Skipped Bars:   {:?}", result.skipped_bars);
    }
    println!();
    println!("--- Performance ---");
    for (key, value) in result.report.entries() {
        if let Some(v) = value {
            println!("{:<22} {}", key, MetricUnit::of(key).format(v));
        }
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_sweep(results: &SweepResults, top: usize) {
    println!();
    println!(
        "=== Sweep: {} ({} points, ranked by {}) ===",
        results.symbol,
        results.len(),
        results.metric
    );
    println!(
        "{:>4}  {:<28} {:>12} {:>10} {:>8} {:>10}",
        "Rank", "Strategy", "Score", "Return", "Trades", "Max DD"
    );
    println!("{}", "-".repeat(78));
    let unit = MetricUnit::of(results.metric.as_str());
    for e in results.top(top) {
        let r = &e.result.report;
        println!(
            "{:>4}  {:<28} {:>12} {:>10} {:>8} {:>10}",
            e.rank,
            e.label,
            unit.format(e.score),
            MetricUnit::Percent.format(r.cumulative_return),
            r.trade_count,
            MetricUnit::Percent.format(r.max_drawdown),
        );
    }
}
