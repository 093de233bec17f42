//! Position — the single live long position.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open long position. At most one exists per run; the engine replaces
/// it with `None` on exit.
///
/// `stop_loss_price` is mutated only by the exit policy's trailing-stop
/// update and only ever ratchets upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Share count, always positive while the position exists.
    pub shares: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    /// Cash paid at entry including fees. Exit profit is measured against
    /// this, not the raw notional.
    pub entry_cost: f64,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    /// High watermark used by the trailing stop.
    pub highest_price_since_entry: f64,
}

impl Position {
    pub fn open(
        shares: u64,
        entry_price: f64,
        entry_date: NaiveDate,
        entry_cost: f64,
        stop_loss_price: f64,
        take_profit_price: f64,
    ) -> Self {
        Self {
            shares,
            entry_price,
            entry_date,
            entry_cost,
            stop_loss_price,
            take_profit_price,
            highest_price_since_entry: entry_price,
        }
    }

    /// Record a bar's high. Returns true if the watermark rose.
    pub fn observe_high(&mut self, high: f64) -> bool {
        if high > self.highest_price_since_entry {
            self.highest_price_since_entry = high;
            true
        } else {
            false
        }
    }

    /// Ratchet the stop upward. A candidate below the current stop is
    /// ignored: stops tighten, never loosen.
    pub fn raise_stop(&mut self, candidate: f64) {
        if candidate > self.stop_loss_price {
            self.stop_loss_price = candidate;
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position::open(
            50,
            100.0,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            5010.0,
            98.0,
            104.0,
        )
    }

    #[test]
    fn watermark_starts_at_entry() {
        let pos = sample_position();
        assert_eq!(pos.highest_price_since_entry, 100.0);
    }

    #[test]
    fn observe_high_ratchets() {
        let mut pos = sample_position();
        assert!(pos.observe_high(103.0));
        assert!(!pos.observe_high(101.0));
        assert_eq!(pos.highest_price_since_entry, 103.0);
    }

    #[test]
    fn raise_stop_never_loosens() {
        let mut pos = sample_position();
        pos.raise_stop(99.0);
        assert_eq!(pos.stop_loss_price, 99.0);
        pos.raise_stop(97.0);
        assert_eq!(pos.stop_loss_price, 99.0);
    }

    #[test]
    fn market_value() {
        let pos = sample_position();
        assert_eq!(pos.market_value(102.0), 5100.0);
    }
}
