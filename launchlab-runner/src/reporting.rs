//! Sweep artifacts — summary CSV and best-row JSON.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::sweep::{SweepOutcome, SweepRow};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub summary_csv: PathBuf,
    pub best_json: PathBuf,
}

/// Write the full artifact set for a sweep into `out_dir`.
pub fn save_artifacts(out_dir: &Path, outcome: &SweepOutcome) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let summary_csv = out_dir.join("summary.csv");
    write_summary_csv(&summary_csv, &outcome.rows)?;

    let best_json = out_dir.join("best.json");
    write_best_json(&best_json, outcome.best.as_ref())?;

    Ok(ArtifactPaths {
        summary_csv,
        best_json,
    })
}

/// One CSV row per sweep combination, in enumeration order.
///
/// Parameter columns are the sorted union of every row's keys, prefixed
/// `param.` so downstream tooling can split them from the metric columns.
pub fn write_summary_csv(path: &Path, rows: &[SweepRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create summary CSV {}", path.display()))?;

    let param_names: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.params.iter().map(|(name, _)| name.as_str()))
        .collect();

    let mut header = vec!["run_id".to_string()];
    header.extend(param_names.iter().map(|name| format!("param.{name}")));
    header.extend(
        [
            "trades",
            "winrate",
            "total_pnl",
            "max_drawdown",
            "avg_hold_secs",
            "pnl_by_origin",
        ]
        .map(String::from),
    );
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.run_id.clone()];
        for &name in &param_names {
            record.push(
                row.params
                    .lookup(name)
                    .map(|v| format!("{v}"))
                    .unwrap_or_default(),
            );
        }
        record.push(row.metrics.trades.to_string());
        record.push(format!("{:.6}", row.metrics.winrate()));
        record.push(format!("{:.8}", row.metrics.total_pnl));
        record.push(format!("{:.6}", row.metrics.max_drawdown));
        record.push(format!("{:.3}", row.metrics.avg_hold_secs()));
        record.push(
            serde_json::to_string(&row.metrics.pnl_by_origin)
                .context("Failed to serialize pnl_by_origin")?,
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// The selected best row as pretty JSON; `null` when nothing was evaluated.
pub fn write_best_json(path: &Path, best: Option<&SweepRow>) -> Result<()> {
    let json = serde_json::to_string_pretty(&best).context("Failed to serialize best row")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write best JSON {}", path.display()))?;
    Ok(())
}
