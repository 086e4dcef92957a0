//! Single-pass scan of an augmented series.

use super::rules::{BollingerDip, MovingAverageDip};
use super::signal::{Signal, SignalLog};
use super::{BuyRule, MissingValue};
use crate::indicators::AugmentedSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule thresholds. Defaults: discount 0.98, projected gain 1.045.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// A rule fires when `close <= buy_discount * reference`.
    pub buy_discount: f64,
    /// `projected_sell_price = trigger_price * projected_gain`.
    pub projected_gain: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            buy_discount: 0.98,
            projected_gain: 1.045,
        }
    }
}

impl SignalParams {
    /// The rules in evaluation order.
    pub fn rules(&self) -> Vec<Box<dyn BuyRule>> {
        vec![
            Box::new(MovingAverageDip::new(self.buy_discount)),
            Box::new(BollingerDip::new(self.buy_discount)),
        ]
    }
}

/// The scan stopped at a bar it could not evaluate.
///
/// `partial` holds every signal appended before the failing bar; those
/// signals are valid.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("signal scan aborted at bar {bar_index} ({date}) by {rule}: {source}")]
pub struct ScanError {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub rule: String,
    pub source: MissingValue,
    pub partial: SignalLog,
}

/// Evaluate every rule on every bar, oldest first.
///
/// Within a bar the moving-average rule runs before the Bollinger rule.
/// No deduplication and no cooldown: consecutive qualifying bars each emit.
pub fn detect_signals(series: &AugmentedSeries, params: &SignalParams) -> Result<SignalLog, ScanError> {
    let rules = params.rules();
    let mut log = SignalLog::new();

    for (bar_index, (bar, row)) in series.iter().enumerate() {
        for rule in &rules {
            match rule.evaluate(bar, row) {
                Ok(true) => {
                    let signal = Signal {
                        bar_index,
                        date: bar.date,
                        trigger_price: bar.close,
                        projected_sell_price: bar.close * params.projected_gain,
                        strategy: rule.strategy(),
                    };
                    tracing::debug!(
                        symbol = series.symbol(),
                        date = %bar.date,
                        close = bar.close,
                        strategy = %signal.strategy,
                        "buy signal"
                    );
                    log.push(signal);
                }
                Ok(false) => {}
                Err(source) => {
                    tracing::warn!(
                        symbol = series.symbol(),
                        bar_index,
                        rule = rule.name(),
                        "scan aborted: {source}"
                    );
                    return Err(ScanError {
                        bar_index,
                        date: bar.date,
                        rule: rule.name().to_string(),
                        source,
                        partial: log,
                    });
                }
            }
        }
    }

    Ok(log)
}
