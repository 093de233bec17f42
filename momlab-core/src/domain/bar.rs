//! Bar — the fundamental market data unit.

use crate::error::MissingIndicator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Indicator column names read by the built-in signal conditions and stop
/// models. Collaborators that precompute indicators attach values under
/// these keys; anything else in the map is carried but ignored.
pub mod indicator {
    /// Stochastic oscillator %K.
    pub const STOCH_K: &str = "stoch_k";
    /// Stochastic oscillator %D (smoothed %K).
    pub const STOCH_D: &str = "stoch_d";
    /// Relative strength index.
    pub const RSI: &str = "rsi";
    /// MACD line.
    pub const MACD: &str = "macd";
    /// MACD signal line.
    pub const MACD_SIGNAL: &str = "macd_signal";
    /// Average true range.
    pub const ATR: &str = "atr";
    /// Probability of an up-move from an external ML scorer, in [0, 1].
    pub const ML_PROB: &str = "ml_prob";
}

/// OHLCV bar plus its precomputed indicator readings.
///
/// Bars arrive from the ingestion boundary already ordered by date, strictly
/// increasing, no duplicates. The engine assumes that ordering; it does not
/// re-check it. Prior-bar indicator values are read from the previous bar's
/// map, so no shifted columns are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Indicator values keyed by [`indicator`] names.
    pub indicators: HashMap<String, f64>,
}

impl Bar {
    /// Look up a required indicator. Absence is an error the engine
    /// surfaces with bar context, never a silent neutral value.
    pub fn indicator(&self, name: &'static str) -> Result<f64, MissingIndicator> {
        self.indicators
            .get(name)
            .copied()
            .ok_or(MissingIndicator(name))
    }

    /// Basic OHLC sanity check: high >= low, extremes contain open/close,
    /// prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}
