//! MomLab Runner — orchestration around the engine.
//!
//! Everything the engine deliberately does not do lives here:
//! - TOML run configuration with validation and a content-addressed run id
//! - CSV bar ingestion with boundary validation
//! - Performance metrics (pure functions over the ledger + equity curve)
//! - Report rendering and JSON/CSV artifact export
//! - Parallel parameter sweeps
//! - Seeded synthetic data for demos, benches, and tests

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sample_data;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_bars, load_bars_from_reader, LoadError};
pub use metrics::{risk_ratios, summarize, Metrics, RiskRatios};
pub use report::{render_summary, save_artifacts, ArtifactPaths, BacktestReport};
pub use runner::{run, RunError};
pub use sample_data::synthetic_bars;
pub use sweep::{run_sweep, ParamGrid, SweepRow};
