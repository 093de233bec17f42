//! Exit policies — stop-loss, take-profit, trailing stop, signal reversal.
//!
//! Evaluation order is fixed and first-match-wins: the trailing stop is
//! updated, then the stop-loss is checked, then the take-profit, then the
//! signal reversal. The stop only ever tightens across bars; the ratchet is
//! enforced by [`Position::raise_stop`].

use crate::domain::bar::{indicator, Bar};
use crate::domain::{ExitReason, Position};
use crate::error::MissingIndicator;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};

/// How stop prices are derived from a reference price (the entry price at
/// entry time, the high watermark while trailing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopModel {
    /// Stop a fixed fraction below the reference (e.g. 0.02 = 2%).
    Percent { fraction: f64 },
    /// Stop `multiplier` ATRs below the reference. Requires the `atr`
    /// indicator on the bar.
    AtrMultiple { multiplier: f64 },
}

impl StopModel {
    pub fn stop_from(&self, reference: f64, bar: &Bar) -> Result<f64, MissingIndicator> {
        match self {
            Self::Percent { fraction } => Ok(reference * (1.0 - fraction)),
            Self::AtrMultiple { multiplier } => {
                Ok(reference - multiplier * bar.indicator(indicator::ATR)?)
            }
        }
    }
}

/// How the take-profit price is derived from the entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetModel {
    /// Target a fixed fraction above the entry (e.g. 0.04 = 4%).
    Percent { fraction: f64 },
    /// Target `multiplier` ATRs above the entry.
    AtrMultiple { multiplier: f64 },
}

impl TargetModel {
    pub fn target_from(&self, entry_price: f64, bar: &Bar) -> Result<f64, MissingIndicator> {
        match self {
            Self::Percent { fraction } => Ok(entry_price * (1.0 + fraction)),
            Self::AtrMultiple { multiplier } => {
                Ok(entry_price + multiplier * bar.indicator(indicator::ATR)?)
            }
        }
    }
}

/// Which signals close an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversalMode {
    /// Exit only on an outright Bearish vote.
    OnBearish,
    /// Exit as soon as the vote is anything but Bullish.
    OnNotBullish,
}

impl ReversalMode {
    fn fires(&self, signal: Signal) -> bool {
        match self {
            Self::OnBearish => signal == Signal::Bearish,
            Self::OnNotBullish => signal != Signal::Bullish,
        }
    }
}

/// Exit policy for an open position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitPolicy {
    pub stop_model: StopModel,
    pub trailing_enabled: bool,
    pub reversal_mode: ReversalMode,
}

impl ExitPolicy {
    /// Evaluate the position against a bar. Mutates only the position's
    /// trailing state (high watermark, ratcheted stop); whether to exit is
    /// returned, never applied here.
    pub fn evaluate(
        &self,
        position: &mut Position,
        bar: &Bar,
        signal: Signal,
    ) -> Result<Option<ExitReason>, MissingIndicator> {
        // Trailing update first: a new high may tighten the stop that the
        // same bar's close is then checked against.
        if position.observe_high(bar.high) && self.trailing_enabled {
            let trail = self
                .stop_model
                .stop_from(position.highest_price_since_entry, bar)?;
            position.raise_stop(trail);
        }

        if bar.close <= position.stop_loss_price {
            return Ok(Some(ExitReason::StopLoss));
        }
        if bar.close >= position.take_profit_price {
            return Ok(Some(ExitReason::TakeProfit));
        }
        if self.reversal_mode.fires(signal) {
            return Ok(Some(ExitReason::SignalReversal));
        }
        Ok(None)
    }
}
