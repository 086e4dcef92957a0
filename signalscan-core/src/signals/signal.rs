//! Signal and the per-run signal log.

use super::Strategy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A detected candidate buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub bar_index: usize,
    pub date: NaiveDate,
    /// Close price that triggered the rule.
    pub trigger_price: f64,
    /// Projected exit: trigger price times the configured gain.
    pub projected_sell_price: f64,
    pub strategy: Strategy,
}

/// Signals in the order they were detected. Append-only within a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalLog {
    signals: Vec<Signal>,
}

impl SignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Signal> {
        self.signals.iter()
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.signals
    }

    pub fn get(&self, index: usize) -> Option<&Signal> {
        self.signals.get(index)
    }

    /// Signals produced by one strategy, in log order.
    pub fn by_strategy(&self, strategy: Strategy) -> impl Iterator<Item = &Signal> {
        self.signals.iter().filter(move |s| s.strategy == strategy)
    }

    pub fn last(&self) -> Option<&Signal> {
        self.signals.last()
    }
}

impl<'a> IntoIterator for &'a SignalLog {
    type Item = &'a Signal;
    type IntoIter = std::slice::Iter<'a, Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(bar_index: usize, strategy: Strategy) -> Signal {
        Signal {
            bar_index,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(bar_index as i64),
            trigger_price: 90.0,
            projected_sell_price: 94.05,
            strategy,
        }
    }

    #[test]
    fn log_preserves_append_order() {
        let mut log = SignalLog::new();
        log.push(signal(3, Strategy::MovingAverage));
        log.push(signal(3, Strategy::BollingerBand));
        log.push(signal(5, Strategy::MovingAverage));
        let indices: Vec<usize> = log.iter().map(|s| s.bar_index).collect();
        assert_eq!(indices, vec![3, 3, 5]);
        assert_eq!(log.by_strategy(Strategy::MovingAverage).count(), 2);
        assert_eq!(log.last().unwrap().bar_index, 5);
    }

    #[test]
    fn log_serializes_as_plain_array() {
        let mut log = SignalLog::new();
        log.push(signal(0, Strategy::BollingerBand));
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["strategy"], "bollinger_band");
    }
}
