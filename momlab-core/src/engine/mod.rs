//! Backtest engine — configuration, state, and the sequential bar loop.
//!
//! A run is a single pass over the bar series. Bar 0 seeds the equity curve
//! at the initial capital and makes no decision (there is no prior bar to
//! vote against); every later bar classifies, drives the exit policy while
//! a position is open or the sizer while flat, and appends one equity point.

pub mod config;
pub mod loop_runner;
pub mod state;

pub use config::EngineConfig;
pub use loop_runner::run_backtest;
pub use state::{EngineState, RunResult, SignalCounts};
