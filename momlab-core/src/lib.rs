//! MomLab Core — the backtest simulation engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, positions, trades)
//! - Signal voting rule (indicator sub-conditions → Bullish/Bearish/Neutral)
//! - Risk-budgeted position sizing
//! - Exit policies (stop-loss, take-profit, trailing stop, signal reversal)
//! - The sequential FLAT/LONG bar loop
//!
//! The engine is a pure state machine: all inputs arrive as arguments, all
//! outputs are returned as values. Market data retrieval, indicator
//! computation, ML scoring, and presentation are collaborators that live
//! outside this crate.

pub mod domain;
pub mod engine;
pub mod error;
pub mod exit;
pub mod risk;
pub mod signal;
