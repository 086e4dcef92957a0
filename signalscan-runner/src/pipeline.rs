//! Scan pipeline: load → compute indicators → detect signals → store.
//!
//! Two entry points:
//! - `run_scan()`: resolves the data source, then scans. Used by the CLI.
//! - `scan_series()`: scans an already-loaded series.
//!
//! A date range only narrows what is scanned. The store always receives the
//! full history the source returned.

use serde::Serialize;
use signalscan_core::broker::OrderRequest;
use signalscan_core::data::{DataError, DataProvider, DataSource, SeriesStore};
use signalscan_core::domain::{normalize_symbol, Series};
use signalscan_core::indicators::{compute_indicators, AugmentedSeries, IndicatorParams};
use signalscan_core::signals::{detect_signals, ScanError, SignalLog, SignalParams};
use std::path::PathBuf;
use thiserror::Error;

use crate::data_loader::{load_series, LoadError, LoadOptions};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("data unavailable for '{symbol}': {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("failed to store '{symbol}': {source}")]
    Store {
        symbol: String,
        #[source]
        source: DataError,
    },

    #[error("'{symbol}' has {count} signal(s); there is no signal #{index}")]
    NoSuchSignal { symbol: String, index: usize, count: usize },
}

/// Indicator and rule parameters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScanSettings {
    pub indicators: IndicatorParams,
    pub signals: SignalParams,
}

/// How the detector finished.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Complete,
    /// Stopped at an unevaluable bar; the report's signals are the partial log.
    Aborted(ScanError),
}

impl ScanOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, ScanOutcome::Complete)
    }
}

#[derive(Debug)]
pub struct ScanReport {
    pub augmented: AugmentedSeries,
    pub signals: SignalLog,
    pub outcome: ScanOutcome,
    pub source: DataSource,
    pub dataset_hash: String,
    /// Flat file written for this run; synthetic runs are never stored.
    pub stored_path: Option<PathBuf>,
}

impl ScanReport {
    pub fn symbol(&self) -> &str {
        self.augmented.symbol()
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Compute indicators and detect signals on a loaded series.
///
/// An aborted scan keeps the signals found before the failing bar.
pub fn scan_series(series: &Series, settings: &ScanSettings) -> (AugmentedSeries, SignalLog, ScanOutcome) {
    let augmented = compute_indicators(series, &settings.indicators);
    match detect_signals(&augmented, &settings.signals) {
        Ok(log) => (augmented, log, ScanOutcome::Complete),
        Err(err) => {
            let partial = err.partial.clone();
            (augmented, partial, ScanOutcome::Aborted(err))
        }
    }
}

/// Load `symbol`, scan it and write the augmented flat file.
///
/// Only the bars inside `opts.start..=opts.end` are scanned, but the stored
/// flat file keeps every bar the source returned.
pub fn run_scan(
    symbol: &str,
    store: &SeriesStore,
    provider: Option<&dyn DataProvider>,
    settings: &ScanSettings,
    opts: &LoadOptions,
) -> Result<ScanReport, RunError> {
    let symbol = normalize_symbol(symbol);
    let symbol = symbol.as_str();
    let loaded = load_series(symbol, store, provider, opts).map_err(|e| data_unavailable(symbol, e))?;

    let (augmented, signals, outcome) = scan_series(&loaded.series, settings);
    tracing::info!(
        symbol,
        source = %loaded.source,
        bars = augmented.len(),
        signals = signals.len(),
        complete = outcome.is_complete(),
        "scan finished"
    );

    let stored_path = if loaded.source == DataSource::Synthetic {
        None
    } else {
        let clipped = opts.start.is_some() || opts.end.is_some();
        let written = if clipped {
            store.write(&compute_indicators(&loaded.history, &settings.indicators))
        } else {
            store.write(&augmented)
        };
        let path = written.map_err(|source| RunError::Store {
            symbol: symbol.to_string(),
            source,
        })?;
        Some(path)
    };

    Ok(ScanReport {
        augmented,
        signals,
        outcome,
        source: loaded.source,
        dataset_hash: loaded.dataset_hash,
        stored_path,
    })
}

/// Build a bracket buy order from the `index`-th signal of a scan.
pub fn order_from_signal(
    report: &ScanReport,
    index: usize,
    qty: f64,
    stop_loss_fraction: f64,
) -> Result<OrderRequest, RunError> {
    let signal = report.signals.get(index).ok_or_else(|| RunError::NoSuchSignal {
        symbol: report.symbol().to_string(),
        index,
        count: report.signals.len(),
    })?;
    Ok(OrderRequest::from_signal(report.symbol(), signal, qty, stop_loss_fraction))
}

fn data_unavailable(symbol: &str, err: LoadError) -> RunError {
    RunError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use signalscan_core::domain::Bar;
    use signalscan_core::signals::Strategy;

    fn series(closes: &[f64]) -> Series {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: base + Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1000.0,
            })
            .collect();
        Series::new("TEST", bars).unwrap()
    }

    #[test]
    fn complete_scan() {
        let (aug, log, outcome) = scan_series(&series(&[100.0, 90.0]), &ScanSettings::default());
        assert_eq!(aug.len(), 2);
        assert_eq!(outcome, ScanOutcome::Complete);
        assert_eq!(log.by_strategy(Strategy::MovingAverage).count(), 1);
    }

    #[test]
    fn aborted_scan_keeps_partial_signals() {
        let (_, log, outcome) = scan_series(&series(&[100.0, 90.0, f64::NAN]), &ScanSettings::default());
        match outcome {
            ScanOutcome::Aborted(err) => {
                assert_eq!(err.bar_index, 2);
                assert_eq!(err.partial, log);
            }
            ScanOutcome::Complete => panic!("scan should abort on a missing close"),
        }
        assert_eq!(log.len(), 1);
    }

    fn report(closes: &[f64]) -> ScanReport {
        let settings = ScanSettings::default();
        let (augmented, signals, outcome) = scan_series(&series(closes), &settings);
        ScanReport {
            augmented,
            signals,
            outcome,
            source: DataSource::Store,
            dataset_hash: String::new(),
            stored_path: None,
        }
    }

    #[test]
    fn order_from_signal_uses_trigger_and_projection() {
        let report = report(&[100.0, 90.0]);
        let signal = report.signals.get(0).unwrap().clone();

        let order = order_from_signal(&report, 0, 3.0, 0.05).unwrap();
        assert_eq!(order.symbol, "TEST");
        assert_eq!(order.qty, 3.0);
        assert_eq!(order.take_profit, signal.projected_sell_price);
        assert!((order.stop_loss - signal.trigger_price * 0.95).abs() < 1e-9);
    }

    #[test]
    fn order_from_missing_signal_is_rejected() {
        let report = report(&[100.0, 90.0]);
        match order_from_signal(&report, 5, 1.0, 0.05) {
            Err(RunError::NoSuchSignal { symbol, index, count }) => {
                assert_eq!(symbol, "TEST");
                assert_eq!(index, 5);
                assert_eq!(count, report.signals.len());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
