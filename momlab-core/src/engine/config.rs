//! Engine configuration and validation.

use crate::error::EngineError;
use crate::exit::{ExitPolicy, ReversalMode, StopModel, TargetModel};
use crate::risk::RiskSizer;
use crate::signal::SignalRule;
use serde::{Deserialize, Serialize};

/// Configuration for a single backtest run.
///
/// Every strategy variant is expressed here as data: thresholds, stop and
/// target models, the reversal mode, and the signal condition set. The
/// engine has no per-variant code branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_capital: f64,
    /// Friction applied per side: entries cost `price * (1 + fee_rate)`,
    /// exits credit `price * (1 - fee_rate)`.
    pub fee_rate: f64,
    pub risk_fraction: f64,
    pub max_utilization: f64,
    pub stop_model: StopModel,
    pub take_profit_model: TargetModel,
    pub trailing_enabled: bool,
    pub reversal_mode: ReversalMode,
    pub signal_rule: SignalRule,
}

impl EngineConfig {
    /// Defaults matching the classic consensus variant: 0.2% fees, 1% risk
    /// per trade, 95% utilization cap, 2% stop, 4% target, no trailing,
    /// exit on an outright bearish vote.
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            fee_rate: 0.002,
            risk_fraction: 0.01,
            max_utilization: 0.95,
            stop_model: StopModel::Percent { fraction: 0.02 },
            take_profit_model: TargetModel::Percent { fraction: 0.04 },
            trailing_enabled: false,
            reversal_mode: ReversalMode::OnBearish,
            signal_rule: SignalRule::consensus(),
        }
    }

    /// Reject out-of-range parameters before a run starts. Nothing here is
    /// recoverable mid-run, so the whole config is checked up front.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_capital > 0.0) {
            return Err(EngineError::config(
                "initial_capital",
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if !(0.0..=0.05).contains(&self.fee_rate) {
            return Err(EngineError::config(
                "fee_rate",
                format!("must be in [0, 0.05], got {}", self.fee_rate),
            ));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(EngineError::config(
                "risk_fraction",
                format!("must be in (0, 1], got {}", self.risk_fraction),
            ));
        }
        if !(self.max_utilization > 0.0 && self.max_utilization <= 1.0) {
            return Err(EngineError::config(
                "max_utilization",
                format!("must be in (0, 1], got {}", self.max_utilization),
            ));
        }
        match self.stop_model {
            StopModel::Percent { fraction } => {
                if !(fraction > 0.0 && fraction < 1.0) {
                    return Err(EngineError::config(
                        "stop_model",
                        format!("percent fraction must be in (0, 1), got {fraction}"),
                    ));
                }
            }
            StopModel::AtrMultiple { multiplier } => {
                if !(multiplier > 0.0) {
                    return Err(EngineError::config(
                        "stop_model",
                        format!("atr multiplier must be positive, got {multiplier}"),
                    ));
                }
            }
        }
        match self.take_profit_model {
            TargetModel::Percent { fraction } => {
                if !(fraction > 0.0) {
                    return Err(EngineError::config(
                        "take_profit_model",
                        format!("percent fraction must be positive, got {fraction}"),
                    ));
                }
            }
            TargetModel::AtrMultiple { multiplier } => {
                if !(multiplier > 0.0) {
                    return Err(EngineError::config(
                        "take_profit_model",
                        format!("atr multiplier must be positive, got {multiplier}"),
                    ));
                }
            }
        }
        if self.signal_rule.is_empty() {
            return Err(EngineError::config(
                "signal_rule",
                "at least one entry condition is required",
            ));
        }
        Ok(())
    }

    pub fn sizer(&self) -> RiskSizer {
        RiskSizer {
            risk_fraction: self.risk_fraction,
            max_utilization: self.max_utilization,
            fee_rate: self.fee_rate,
        }
    }

    pub fn exit_policy(&self) -> ExitPolicy {
        ExitPolicy {
            stop_model: self.stop_model,
            trailing_enabled: self.trailing_enabled,
            reversal_mode: self.reversal_mode,
        }
    }
}
