//! Report assembly and artifact export.
//!
//! A [`BacktestReport`] bundles everything a caller needs to inspect a run:
//! the config echo, the metrics, and the engine's plain outputs. Rendering
//! here is text and files; anything richer is a downstream concern.

use crate::config::{BacktestConfig, RunId};
use crate::metrics::{Metrics, RiskRatios};
use anyhow::{Context, Result};
use momlab_core::engine::RunResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Complete record of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub run_id: RunId,
    pub symbol: Option<String>,
    pub config: BacktestConfig,
    pub metrics: Metrics,
    pub risk_ratios: RiskRatios,
    pub result: RunResult,
}

/// Render a one-screen text summary.
pub fn render_summary(report: &BacktestReport) -> String {
    let mut out = String::new();
    let label = report.symbol.as_deref().unwrap_or("series");
    let _ = writeln!(out, "run {} ({label})", &report.run_id[..12.min(report.run_id.len())]);
    let _ = writeln!(
        out,
        "  bars: {}   signals: {} bullish / {} bearish / {} neutral",
        report.result.bar_count,
        report.result.signal_counts.bullish,
        report.result.signal_counts.bearish,
        report.result.signal_counts.neutral,
    );
    let _ = writeln!(
        out,
        "  trades: {} completed ({} wins, {:.1}% win rate), {} entries skipped",
        report.metrics.total_trades,
        report.metrics.profitable_trades,
        report.metrics.win_rate_pct,
        report.result.skipped_entries,
    );
    let _ = writeln!(
        out,
        "  return: {:+.2}% total, {:+.2}% annualized   max drawdown: {:.2}%",
        report.metrics.total_return_pct,
        report.metrics.annual_return_pct,
        report.metrics.max_drawdown_pct,
    );
    let _ = writeln!(
        out,
        "  sharpe: {:.2}   sortino: {:.2}   calmar: {:.2}",
        report.risk_ratios.sharpe, report.risk_ratios.sortino, report.risk_ratios.calmar,
    );
    let _ = writeln!(
        out,
        "  equity: {:.2} final (peak {:.2})",
        report.result.final_equity, report.result.peak_equity,
    );
    if let Some(pos) = &report.result.open_position {
        let _ = writeln!(
            out,
            "  open position: {} shares @ {:.2}, stop {:.2}",
            pos.shares, pos.entry_price, pos.stop_loss_price,
        );
    }
    out
}

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub report_json: PathBuf,
    pub trades_json: PathBuf,
    pub equity_csv: PathBuf,
}

/// Write run artifacts under `output_dir/<run_id>/`.
pub fn save_artifacts(report: &BacktestReport, output_dir: impl AsRef<Path>) -> Result<ArtifactPaths> {
    let run_dir = output_dir.as_ref().join(&report.run_id);
    std::fs::create_dir_all(&run_dir).context("failed to create run artifact directory")?;

    let report_json = run_dir.join("report.json");
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(&report_json, json).context("failed to write report.json")?;

    let trades_json = run_dir.join("trades.json");
    let json = serde_json::to_string_pretty(&report.result.trades)
        .context("failed to serialize trades")?;
    std::fs::write(&trades_json, json).context("failed to write trades.json")?;

    let equity_csv = run_dir.join("equity.csv");
    let mut csv = String::from("bar,equity\n");
    for (i, equity) in report.result.equity_curve.iter().enumerate() {
        let _ = writeln!(csv, "{i},{equity}");
    }
    std::fs::write(&equity_csv, csv).context("failed to write equity.csv")?;

    Ok(ArtifactPaths {
        report_json,
        trades_json,
        equity_csv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::runner::run;
    use crate::sample_data::synthetic_bars;

    fn sample_report() -> BacktestReport {
        let bars = synthetic_bars(120, 7, 0.0008, 0.012);
        run(&BacktestConfig::default(), &bars).unwrap()
    }

    #[test]
    fn summary_mentions_the_essentials() {
        let report = sample_report();
        let text = render_summary(&report);
        assert!(text.contains("trades:"));
        assert!(text.contains("max drawdown"));
        assert!(text.contains("sharpe"));
    }

    #[test]
    fn report_json_roundtrip() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let deser: BacktestReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.run_id, report.run_id);
        assert_eq!(deser.result.equity_curve, report.result.equity_curve);
        assert_eq!(
            deser.metrics,
            metrics::summarize(
                &deser.result.trades,
                &deser.result.equity_curve,
                deser.config.initial_capital,
                119.0,
            )
        );
    }
}
