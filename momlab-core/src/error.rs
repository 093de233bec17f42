//! Error taxonomy for the engine.
//!
//! Two fatal categories: a bar missing a required indicator (the run aborts
//! with the offending bar pinpointed) and an invalid configuration (rejected
//! before the run starts). Numeric edge cases with a defined neutral outcome
//! (insufficient capital, non-positive stop distance) are not errors and are
//! handled where they occur.

use chrono::NaiveDate;
use thiserror::Error;

/// A required indicator column is absent from a bar.
///
/// Raised inside signal conditions and stop models, which see a single bar
/// and know only the indicator name. The engine attaches the bar's position
/// before surfacing it as [`EngineError::MissingIndicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingIndicator(pub &'static str);

/// Fatal errors from a backtest run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("bar {bar_index} ({date}): missing indicator '{indicator}'")]
    MissingIndicator {
        indicator: &'static str,
        bar_index: usize,
        date: NaiveDate,
    },

    #[error("invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl EngineError {
    /// Attach bar context to a [`MissingIndicator`].
    pub fn missing(err: MissingIndicator, bar_index: usize, date: NaiveDate) -> Self {
        Self::MissingIndicator {
            indicator: err.0,
            bar_index,
            date,
        }
    }

    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
