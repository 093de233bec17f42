//! Risk sizing — integer share quantity under a risk budget.
//!
//! Classic fixed-fractional sizing: risk a fraction of cash per trade, with
//! the stop distance as the per-share loss, capped by a maximum capital
//! utilization and by what the cash on hand can actually pay for after fees.

use serde::{Deserialize, Serialize};

/// Position sizer. All fields are fractions validated by the engine config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSizer {
    /// Max fraction of cash lost if the stop is hit (e.g. 0.01 = 1%).
    pub risk_fraction: f64,
    /// Max fraction of cash committed to a single entry (e.g. 0.95).
    pub max_utilization: f64,
    /// Round-trip friction per side (e.g. 0.002 = 0.2%).
    pub fee_rate: f64,
}

impl RiskSizer {
    /// Compute a share quantity for an entry at `entry_price` with a stop
    /// at `stop_loss_price`.
    ///
    /// # Formula
    /// ```text
    /// risk_per_trade = cash * risk_fraction
    /// stop_distance  = entry_price - stop_loss_price
    /// shares = floor(min(risk_per_trade / stop_distance,
    ///                    cash * max_utilization / entry_price))
    /// ```
    ///
    /// Returns 0 when there is no valid size: non-positive stop distance,
    /// the floor reaching zero, or the fee-inclusive cost exceeding cash.
    /// Zero means "do not enter"; it is never an error.
    pub fn size(&self, cash: f64, entry_price: f64, stop_loss_price: f64) -> u64 {
        if cash <= 0.0 || entry_price <= 0.0 {
            return 0;
        }

        let stop_distance = entry_price - stop_loss_price;
        if stop_distance <= 0.0 {
            return 0;
        }

        let risk_per_trade = cash * self.risk_fraction;
        let raw_shares = risk_per_trade / stop_distance;
        let utilization_cap = cash * self.max_utilization / entry_price;
        let shares = raw_shares.min(utilization_cap).floor();
        if shares < 1.0 {
            return 0;
        }

        let shares = shares as u64;
        let cost = shares as f64 * entry_price * (1.0 + self.fee_rate);
        if cost > cash {
            return 0;
        }
        shares
    }
}
