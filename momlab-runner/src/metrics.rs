//! Performance metrics — pure functions over the ledger and equity curve.
//!
//! Every metric is equity curve and/or trade list in, scalar out. Degenerate
//! inputs (empty ledger, single point, zero elapsed time) return 0.0 by
//! contract, never NaN and never an error.

use momlab_core::domain::Trade;
use serde::{Deserialize, Serialize};

/// Trading days per year, for annualizing daily-return statistics.
const TRADING_DAYS: f64 = 252.0;

/// Summary statistics for a single backtest run.
///
/// Percentages throughout (5.0 means 5%). A run with no completed trades
/// reports zeros across the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub annual_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub profitable_trades: usize,
    pub win_rate_pct: f64,
}

impl Metrics {
    pub fn zeroed() -> Self {
        Self {
            total_return_pct: 0.0,
            annual_return_pct: 0.0,
            max_drawdown_pct: 0.0,
            total_trades: 0,
            profitable_trades: 0,
            win_rate_pct: 0.0,
        }
    }
}

/// Compute all summary metrics.
///
/// `elapsed_days` is calendar days between the first and last bar; it feeds
/// the annualization. A ledger with no completed (Sell) trades yields
/// [`Metrics::zeroed`] regardless of the curve.
pub fn summarize(
    trades: &[Trade],
    equity_curve: &[f64],
    initial_capital: f64,
    elapsed_days: f64,
) -> Metrics {
    let total_trades = trades.iter().filter(|t| t.is_exit()).count();
    if total_trades == 0 {
        return Metrics::zeroed();
    }

    let total_return_pct = total_return_pct(equity_curve, initial_capital);
    let profitable_trades = trades.iter().filter(|t| t.is_winner()).count();

    Metrics {
        total_return_pct,
        annual_return_pct: annual_return_pct(total_return_pct, elapsed_days),
        max_drawdown_pct: max_drawdown_pct(equity_curve),
        total_trades,
        profitable_trades,
        win_rate_pct: profitable_trades as f64 / total_trades as f64 * 100.0,
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a percentage of the initial capital.
pub fn total_return_pct(equity_curve: &[f64], initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    match equity_curve.last() {
        Some(&final_equity) => (final_equity - initial_capital) / initial_capital * 100.0,
        None => 0.0,
    }
}

/// Annualized return from a total return over `elapsed_days` calendar days.
///
/// Sub-day series (zero elapsed years) return the total unchanged rather
/// than dividing by zero.
pub fn annual_return_pct(total_return_pct: f64, elapsed_days: f64) -> f64 {
    let years = elapsed_days / 365.25;
    if years > 0.0 {
        ((1.0 + total_return_pct / 100.0).powf(1.0 / years) - 1.0) * 100.0
    } else {
        total_return_pct
    }
}

/// Maximum peak-to-trough decline as a positive percentage.
pub fn max_drawdown_pct(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        if peak > 0.0 {
            let dd = (peak - equity) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

// ─── Risk-adjusted ratios ───────────────────────────────────────────

/// Risk-adjusted return ratios, annualized over 252 trading days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRatios {
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
}

/// Compute Sharpe, Sortino, and Calmar from the equity curve alone.
/// Constant or too-short curves yield zeros.
pub fn risk_ratios(equity_curve: &[f64]) -> RiskRatios {
    RiskRatios {
        sharpe: sharpe_ratio(equity_curve),
        sortino: sortino_ratio(equity_curve),
        calmar: calmar_ratio(equity_curve),
    }
}

/// Annualized Sharpe ratio from daily returns, risk-free rate zero.
/// Returns 0.0 for zero variance or fewer than 2 bars.
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * TRADING_DAYS.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
/// Returns 0.0 with no down days or fewer than 2 bars.
pub fn sortino_ratio(equity_curve: &[f64]) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let downside_sq: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).collect();
    if downside_sq.is_empty() {
        return 0.0;
    }
    let downside_std = (downside_sq.iter().sum::<f64>() / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean / downside_std) * TRADING_DAYS.sqrt()
}

/// Calmar ratio: annualized growth rate over max drawdown.
/// Returns 0.0 when there is no drawdown or no growth.
pub fn calmar_ratio(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let final_equity = *equity_curve.last().unwrap();
    if initial <= 0.0 || final_equity <= 0.0 {
        return 0.0;
    }
    let years = equity_curve.len() as f64 / TRADING_DAYS;
    let growth = (final_equity / initial).powf(1.0 / years) - 1.0;
    let dd = max_drawdown_pct(equity_curve) / 100.0;
    if dd < 1e-15 || growth <= 0.0 {
        return 0.0;
    }
    growth / dd
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Daily returns from an equity curve.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
