//! Signal voting — turns a bar's indicator readings into a trade signal.
//!
//! A [`SignalRule`] is a set of boolean sub-conditions over the current and
//! previous bar. The vote is unanimous-or-nothing: every condition holding
//! is Bullish, none holding is Bearish, any partial agreement is Neutral.
//! Conditions are configuration data, so stricter and looser strategy
//! variants share one classifier.

use crate::domain::bar::{indicator, Bar};
use crate::error::MissingIndicator;
use serde::{Deserialize, Serialize};

/// Per-bar categorical verdict. Derived, never persisted apart from the
/// bar it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

/// One boolean sub-condition of the voting rule.
///
/// "Rising" compares the current bar's reading against the previous bar's
/// reading of the same indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryCondition {
    /// Stochastic %K above `threshold` and rising.
    StochRising { threshold: f64 },
    /// RSI above `threshold` and rising.
    RsiRising { threshold: f64 },
    /// MACD above its signal line and rising.
    MacdBullish,
    /// External ML up-move probability above `threshold`.
    MlProbability { threshold: f64 },
}

impl EntryCondition {
    /// Short name for logs and sweep labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StochRising { .. } => "stoch_rising",
            Self::RsiRising { .. } => "rsi_rising",
            Self::MacdBullish => "macd_bullish",
            Self::MlProbability { .. } => "ml_probability",
        }
    }

    /// Evaluate against the current and previous bar.
    pub fn holds(&self, bar: &Bar, prev: &Bar) -> Result<bool, MissingIndicator> {
        match self {
            Self::StochRising { threshold } => {
                let k = bar.indicator(indicator::STOCH_K)?;
                let k_prev = prev.indicator(indicator::STOCH_K)?;
                Ok(k > *threshold && k > k_prev)
            }
            Self::RsiRising { threshold } => {
                let rsi = bar.indicator(indicator::RSI)?;
                let rsi_prev = prev.indicator(indicator::RSI)?;
                Ok(rsi > *threshold && rsi > rsi_prev)
            }
            Self::MacdBullish => {
                let macd = bar.indicator(indicator::MACD)?;
                let signal = bar.indicator(indicator::MACD_SIGNAL)?;
                let macd_prev = prev.indicator(indicator::MACD)?;
                Ok(macd > signal && macd > macd_prev)
            }
            Self::MlProbability { threshold } => {
                Ok(bar.indicator(indicator::ML_PROB)? > *threshold)
            }
        }
    }
}

/// The configured set of sub-conditions.
///
/// An empty set is rejected at config validation; it would classify every
/// bar as both "all hold" and "none hold".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub conditions: Vec<EntryCondition>,
}

impl SignalRule {
    pub fn new(conditions: Vec<EntryCondition>) -> Self {
        Self { conditions }
    }

    /// The classic three-vote momentum consensus: stochastic, RSI, and
    /// MACD all confirming.
    pub fn consensus() -> Self {
        Self::new(vec![
            EntryCondition::StochRising { threshold: 50.0 },
            EntryCondition::RsiRising { threshold: 50.0 },
            EntryCondition::MacdBullish,
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Count votes and classify. A missing indicator surfaces as an error,
    /// never as a silent Neutral.
    pub fn classify(&self, bar: &Bar, prev: &Bar) -> Result<Signal, MissingIndicator> {
        let mut held = 0usize;
        for condition in &self.conditions {
            if condition.holds(bar, prev)? {
                held += 1;
            }
        }
        Ok(if held == self.conditions.len() {
            Signal::Bullish
        } else if held == 0 {
            Signal::Bearish
        } else {
            Signal::Neutral
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn bar_with(entries: &[(&str, f64)]) -> Bar {
        let indicators: HashMap<String, f64> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: 1000,
            indicators,
        }
    }

    fn momentum_bar(stoch: f64, rsi: f64, macd: f64, macd_signal: f64) -> Bar {
        bar_with(&[
            (indicator::STOCH_K, stoch),
            (indicator::RSI, rsi),
            (indicator::MACD, macd),
            (indicator::MACD_SIGNAL, macd_signal),
        ])
    }

    #[test]
    fn all_conditions_hold_is_bullish() {
        let prev = momentum_bar(52.0, 55.0, 0.5, 0.6);
        let bar = momentum_bar(60.0, 58.0, 1.0, 0.8);
        let signal = SignalRule::consensus().classify(&bar, &prev).unwrap();
        assert_eq!(signal, Signal::Bullish);
    }

    #[test]
    fn no_condition_holds_is_bearish() {
        let prev = momentum_bar(45.0, 48.0, 1.0, 0.5);
        let bar = momentum_bar(40.0, 44.0, 0.4, 0.5);
        let signal = SignalRule::consensus().classify(&bar, &prev).unwrap();
        assert_eq!(signal, Signal::Bearish);
    }

    #[test]
    fn partial_agreement_is_neutral() {
        // Stochastic rising above 50, RSI falling, MACD below signal.
        let prev = momentum_bar(52.0, 55.0, 0.4, 0.6);
        let bar = momentum_bar(60.0, 50.0, 0.5, 0.6);
        let signal = SignalRule::consensus().classify(&bar, &prev).unwrap();
        assert_eq!(signal, Signal::Neutral);
    }

    #[test]
    fn threshold_is_exclusive() {
        // %K rising but sitting exactly on the threshold does not count.
        let prev = momentum_bar(40.0, 40.0, 0.4, 0.6);
        let bar = momentum_bar(50.0, 40.0, 0.4, 0.6);
        let rule = SignalRule::new(vec![EntryCondition::StochRising { threshold: 50.0 }]);
        assert_eq!(rule.classify(&bar, &prev).unwrap(), Signal::Bearish);
    }

    #[test]
    fn missing_indicator_is_an_error() {
        let prev = momentum_bar(52.0, 55.0, 0.5, 0.6);
        let bar = bar_with(&[(indicator::STOCH_K, 60.0)]); // no RSI
        let err = SignalRule::consensus().classify(&bar, &prev).unwrap_err();
        assert_eq!(err, MissingIndicator(indicator::RSI));
    }

    #[test]
    fn ml_condition_reads_probability() {
        let rule = SignalRule::new(vec![EntryCondition::MlProbability { threshold: 0.6 }]);
        let prev = bar_with(&[(indicator::ML_PROB, 0.4)]);
        let confident = bar_with(&[(indicator::ML_PROB, 0.8)]);
        let doubtful = bar_with(&[(indicator::ML_PROB, 0.5)]);
        assert_eq!(rule.classify(&confident, &prev).unwrap(), Signal::Bullish);
        assert_eq!(rule.classify(&doubtful, &prev).unwrap(), Signal::Bearish);
    }

    #[test]
    fn rule_serialization_roundtrip() {
        let rule = SignalRule::consensus();
        let json = serde_json::to_string(&rule).unwrap();
        let deser: SignalRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, deser);
    }
}
