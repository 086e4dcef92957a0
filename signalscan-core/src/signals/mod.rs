//! Buy-signal detection over an augmented series.
//!
//! Rules see one bar and its indicator row at a time and never the bars
//! after it. They never see orders or positions either: detection and
//! order placement are separate steps.

pub mod detector;
pub mod rules;
pub mod signal;

pub use detector::{detect_signals, ScanError, SignalParams};
pub use rules::{BollingerDip, MovingAverageDip};
pub use signal::{Signal, SignalLog};

use crate::domain::Bar;
use crate::indicators::IndicatorRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which rule produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MovingAverage,
    BollingerBand,
}

impl Strategy {
    /// Short operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::MovingAverage => "MA",
            Strategy::BollingerBand => "BOLL",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::MovingAverage => write!(f, "moving_average"),
            Strategy::BollingerBand => write!(f, "bollinger_band"),
        }
    }
}

/// A required input was missing for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing {field}")]
pub struct MissingValue {
    pub field: &'static str,
}

/// A threshold rule evaluated once per bar.
pub trait BuyRule: Send + Sync {
    fn name(&self) -> &str;

    fn strategy(&self) -> Strategy;

    /// `Ok(true)` when the bar triggers a buy. An undefined optional input
    /// (e.g. no band yet) is `Ok(false)`; a missing required input is an error.
    fn evaluate(&self, bar: &Bar, row: &IndicatorRow) -> Result<bool, MissingValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_labels() {
        assert_eq!(Strategy::MovingAverage.label(), "MA");
        assert_eq!(Strategy::BollingerBand.label(), "BOLL");
        assert_eq!(Strategy::BollingerBand.to_string(), "bollinger_band");
    }

    #[test]
    fn strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::MovingAverage).unwrap();
        assert_eq!(json, "\"moving_average\"");
    }

    /// Rules only receive a bar and its indicator row. If someone widens
    /// the signature to pass order or account state, this stops compiling.
    #[test]
    fn buy_rule_sees_only_market_data() {
        fn _check(rule: &dyn BuyRule, bar: &Bar, row: &IndicatorRow) -> Result<bool, MissingValue> {
            rule.evaluate(bar, row)
        }
    }
}
