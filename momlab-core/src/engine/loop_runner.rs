//! The sequential bar loop — the heart of the backtester.
//!
//! Per bar, in order:
//! 1. Classify the bar against its predecessor.
//! 2. LONG: evaluate the exit policy (trailing update, stop, target,
//!    reversal); on a hit, settle the exit and append a Sell.
//! 3. FLAT: on a Bullish vote, size an entry under the risk budget; on a
//!    positive size, settle the entry and append a Buy.
//! 4. Append one mark-to-market equity point and update the peak.
//!
//! Bar `i`'s decision depends only on bars `0..=i`. There is no lookahead,
//! no I/O, and no state shared across runs.

use tracing::debug;

use crate::domain::{Bar, Position, Trade, TradeSide};
use crate::error::EngineError;
use crate::signal::Signal;

use super::config::EngineConfig;
use super::state::{EngineState, RunResult, SignalCounts};

/// Run a backtest over an ordered bar series.
///
/// The first bar seeds the equity curve and makes no decision (the voting
/// rule needs a prior bar). An exit and a fresh entry never happen on the
/// same bar. The terminal state is whatever holds after the last bar; an
/// open position is reported, not force-closed.
///
/// Fails fast on an invalid config or on a bar missing a required
/// indicator, identifying the offending bar. An empty series is a valid
/// run with an empty ledger.
pub fn run_backtest(bars: &[Bar], config: &EngineConfig) -> Result<RunResult, EngineError> {
    config.validate()?;

    let mut state = EngineState::new(config.initial_capital);
    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve: Vec<f64> = Vec::with_capacity(bars.len());
    let mut signal_counts = SignalCounts::default();
    let mut skipped_entries = 0usize;

    let sizer = config.sizer();
    let exit_policy = config.exit_policy();

    // The seed bar contributes an equity point but no decision.
    if !bars.is_empty() {
        equity_curve.push(config.initial_capital);
    }

    for i in 1..bars.len() {
        let bar = &bars[i];
        let prev = &bars[i - 1];

        let signal = config
            .signal_rule
            .classify(bar, prev)
            .map_err(|e| EngineError::missing(e, i, bar.date))?;
        match signal {
            Signal::Bullish => signal_counts.bullish += 1,
            Signal::Bearish => signal_counts.bearish += 1,
            Signal::Neutral => signal_counts.neutral += 1,
        }

        match state.position.take() {
            Some(mut position) => {
                let exit = exit_policy
                    .evaluate(&mut position, bar, signal)
                    .map_err(|e| EngineError::missing(e, i, bar.date))?;
                match exit {
                    Some(reason) => {
                        let revenue = position.market_value(bar.close) * (1.0 - config.fee_rate);
                        let profit = revenue - position.entry_cost;
                        let profit_pct = profit / position.entry_cost * 100.0;
                        state.cash += revenue;
                        trades.push(Trade {
                            date: bar.date,
                            side: TradeSide::Sell,
                            price: bar.close,
                            shares: position.shares,
                            cash_delta: revenue,
                            capital_after: state.cash,
                            profit: Some(profit),
                            profit_pct: Some(profit_pct),
                            exit_reason: Some(reason),
                        });
                        // position dropped: back to FLAT
                    }
                    None => state.position = Some(position),
                }
            }
            None => {
                if signal == Signal::Bullish {
                    let stop_loss = config
                        .stop_model
                        .stop_from(bar.close, bar)
                        .map_err(|e| EngineError::missing(e, i, bar.date))?;
                    let shares = sizer.size(state.cash, bar.close, stop_loss);
                    if shares > 0 {
                        let take_profit = config
                            .take_profit_model
                            .target_from(bar.close, bar)
                            .map_err(|e| EngineError::missing(e, i, bar.date))?;
                        let cost = shares as f64 * bar.close * (1.0 + config.fee_rate);
                        state.cash -= cost;
                        state.position = Some(Position::open(
                            shares,
                            bar.close,
                            bar.date,
                            cost,
                            stop_loss,
                            take_profit,
                        ));
                        trades.push(Trade {
                            date: bar.date,
                            side: TradeSide::Buy,
                            price: bar.close,
                            shares,
                            cash_delta: -cost,
                            capital_after: state.cash,
                            profit: None,
                            profit_pct: None,
                            exit_reason: None,
                        });
                    } else {
                        skipped_entries += 1;
                        debug!(
                            bar_index = i,
                            date = %bar.date,
                            cash = state.cash,
                            close = bar.close,
                            "bullish vote skipped: no affordable size under the risk budget"
                        );
                    }
                }
            }
        }

        let equity = state.equity_at(bar.close);
        equity_curve.push(equity);
        if equity > state.peak_equity {
            state.peak_equity = equity;
        }
    }

    debug_assert_eq!(equity_curve.len(), bars.len());

    let final_equity = equity_curve.last().copied().unwrap_or(config.initial_capital);
    Ok(RunResult {
        trades,
        equity_curve,
        final_equity,
        peak_equity: state.peak_equity,
        bar_count: bars.len(),
        open_position: state.position,
        skipped_entries,
        signal_counts,
    })
}
