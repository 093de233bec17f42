//! Trade — an immutable ledger entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalReversal,
}

/// One ledger entry: a Buy on entry, a Sell on exit.
///
/// Trades are appended and never mutated; the ledger is the single source
/// of truth for the metrics layer. Profit fields are populated on Sell rows
/// only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub price: f64,
    pub shares: u64,
    /// Signed cash movement: negative on entry, positive on exit.
    pub cash_delta: f64,
    /// Cash on hand after this trade settled.
    pub capital_after: f64,
    /// Net profit against the entry cost of the same position (Sell only).
    pub profit: Option<f64>,
    /// Profit as a percentage of the entry cost (Sell only).
    pub profit_pct: Option<f64>,
    pub exit_reason: Option<ExitReason>,
}

impl Trade {
    pub fn is_exit(&self) -> bool {
        self.side == TradeSide::Sell
    }

    pub fn is_winner(&self) -> bool {
        self.profit.is_some_and(|p| p > 0.0)
    }
}
