//! Artifact export — JSON round-trip, CSV trade log, CSV report.
//!
//! An artifact directory holds:
//! - `result.json` — the full `BacktestResult`
//! - `trades.csv` — `type,index,date,price,profit`
//! - `report.csv` — `metric,value` in canonical key order
//!
//! Non-finite floats are written as JSON `null`; ratio fields read `null`
//! back as +∞.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use signallab_core::domain::Trade;

use crate::runner::{BacktestResult, SCHEMA_VERSION};

/// Length of the hash prefix used in artifact directory names.
const DIR_HASH_PREFIX: usize = 12;

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty-printed JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON.
///
/// Rejects results written by a newer schema than this build understands.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (this build supports up to {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Export the trade log as CSV. `profit` is empty on buys.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["type", "index", "date", "price", "profit"])?;

    for t in trades {
        let profit = t.profit.map(|p| format!("{p:.6}")).unwrap_or_default();
        wtr.write_record([
            t.side.as_str(),
            &t.index.to_string(),
            &t.date.to_string(),
            &format!("{:.6}", t.price),
            &profit,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the performance report as `metric,value` rows.
///
/// Absent currency metrics are written with an empty value; infinities as `inf`.
pub fn export_report_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["metric", "value"])?;
    for (key, value) in result.report.entries() {
        let value = value.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([key, value.as_str()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a result: `{symbol}_{hash prefix}`.
///
/// Uses the run id when present, otherwise the dataset hash, so the name is
/// stable across reruns of the same input.
pub fn artifact_dir_name(result: &BacktestResult) -> String {
    let hash = result.run_id.as_deref().unwrap_or(&result.dataset_hash);
    let prefix = &hash[..hash.len().min(DIR_HASH_PREFIX)];
    let symbol: String = result
        .symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{symbol}_{prefix}")
}

/// Save the full artifact set for a single backtest run.
///
/// Returns the path to the created directory. Existing files are overwritten.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(result));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    write_file(&run_dir.join("result.json"), &json)?;

    let trades_csv = export_trades_csv(&result.trades)?;
    write_file(&run_dir.join("trades.csv"), &trades_csv)?;

    let report_csv = export_report_csv(result)?;
    write_file(&run_dir.join("report.csv"), &report_csv)?;

    debug!(dir = %run_dir.display(), "artifacts written");
    Ok(run_dir)
}

/// Load a `BacktestResult` from an artifact directory's result.json.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
