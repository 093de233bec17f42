//! Single-run orchestration: config + bars in, report out.

use crate::config::{BacktestConfig, ConfigError};
use crate::metrics::{risk_ratios, summarize};
use crate::report::BacktestReport;
use momlab_core::domain::Bar;
use momlab_core::engine::run_backtest;
use momlab_core::error::EngineError;
use thiserror::Error;
use tracing::info;

/// Errors from a complete run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Execute one backtest and assemble its report.
///
/// Elapsed time for annualization is calendar days between the first and
/// last bar; an empty or single-bar series counts as zero days.
pub fn run(config: &BacktestConfig, bars: &[Bar]) -> Result<BacktestReport, RunError> {
    let engine_config = config.to_engine_config()?;
    let result = run_backtest(bars, &engine_config)?;

    let elapsed_days = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days() as f64,
        _ => 0.0,
    };
    let metrics = summarize(
        &result.trades,
        &result.equity_curve,
        config.initial_capital,
        elapsed_days,
    );
    let ratios = risk_ratios(&result.equity_curve);

    let run_id = config.run_id();
    info!(
        run_id = %run_id,
        bars = result.bar_count,
        trades = metrics.total_trades,
        total_return_pct = metrics.total_return_pct,
        "backtest complete"
    );

    Ok(BacktestReport {
        run_id,
        symbol: config.symbol.clone(),
        config: config.clone(),
        metrics,
        risk_ratios: ratios,
        result,
    })
}
