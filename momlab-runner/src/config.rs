//! Serializable backtest configuration.
//!
//! The TOML-facing schema mirrors the engine config field for field, plus a
//! label for reports. Validation happens when converting to the engine
//! config, so a bad file is rejected before any bars are touched.

use momlab_core::engine::EngineConfig;
use momlab_core::error::EngineError;
use momlab_core::exit::{ReversalMode, StopModel, TargetModel};
use momlab_core::signal::{EntryCondition, SignalRule};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Serializable configuration for a single backtest run.
///
/// Two runs with identical configs produce the same [`RunId`], which makes
/// results content-addressable and sweeps deduplicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Label for reports only; the engine itself is symbol-agnostic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub initial_capital: f64,
    pub fee_rate: f64,
    pub risk_fraction: f64,
    pub max_utilization: f64,
    pub stop: StopModel,
    pub take_profit: TargetModel,
    pub trailing_enabled: bool,
    pub reversal_mode: ReversalMode,
    /// Entry conditions of the voting rule.
    pub signal_rule: Vec<EntryCondition>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        let engine = EngineConfig::new(10_000.0);
        Self {
            symbol: None,
            initial_capital: engine.initial_capital,
            fee_rate: engine.fee_rate,
            risk_fraction: engine.risk_fraction,
            max_utilization: engine.max_utilization,
            stop: engine.stop_model,
            take_profit: engine.take_profit_model,
            trailing_enabled: engine.trailing_enabled,
            reversal_mode: engine.reversal_mode,
            signal_rule: engine.signal_rule.conditions,
        }
    }
}

impl BacktestConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Build and validate the engine config. Out-of-range parameters are
    /// rejected here, before a run starts.
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let config = EngineConfig {
            initial_capital: self.initial_capital,
            fee_rate: self.fee_rate,
            risk_fraction: self.risk_fraction,
            max_utilization: self.max_utilization,
            stop_model: self.stop,
            take_profit_model: self.take_profit,
            trailing_enabled: self.trailing_enabled,
            reversal_mode: self.reversal_mode,
            signal_rule: SignalRule::new(self.signal_rule.clone()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Deterministic hash id for this configuration.
    ///
    /// Serde_json's struct field order is declaration order, so the JSON is
    /// canonical and the hash is stable across runs and machines.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("BacktestConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
