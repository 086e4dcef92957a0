//! Full scan runs through `run_scan` with a stub provider and a temp store.

use chrono::NaiveDate;
use signalscan_core::data::{DataError, DataProvider, DataSource, FetchResult, SeriesStore};
use signalscan_core::domain::{Bar, Series};
use signalscan_core::signals::Strategy;
use signalscan_runner::{order_from_signal, run_scan, ChartRenderer, HtmlChart, LoadOptions, RunError, ScanOutcome, ScanSettings};

struct StubProvider {
    closes: Vec<f64>,
}

impl DataProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let bars = self
            .closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: 5000.0,
            })
            .collect();
        Ok(FetchResult {
            series: Series::new(symbol, bars)?,
            source: DataSource::AlphaVantage,
        })
    }
}

#[test]
fn downloaded_scan_is_stored_and_charted() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data"));
    let provider = StubProvider {
        closes: vec![100.0, 90.0, 91.0, 92.0],
    };

    let report = run_scan(
        "ACME",
        &store,
        Some(&provider),
        &ScanSettings::default(),
        &LoadOptions::default(),
    )
    .unwrap();

    assert_eq!(report.symbol(), "ACME");
    assert_eq!(report.source, DataSource::AlphaVantage);
    assert!(report.outcome.is_complete());
    let first = report.signals.get(0).unwrap();
    assert_eq!(first.strategy, Strategy::MovingAverage);
    assert_eq!(first.bar_index, 1);

    let stored = report.stored_path.as_ref().unwrap();
    assert!(stored.ends_with("Data-for-ACME.csv"));

    let chart = HtmlChart::new(dir.path());
    let html = chart.render("ACME", &report.augmented, &report.signals).unwrap();
    assert!(html.exists());

    // second run comes from the store and sees the same bars
    let again = run_scan("ACME", &store, None, &ScanSettings::default(), &LoadOptions::default()).unwrap();
    assert_eq!(again.source, DataSource::Store);
    assert_eq!(again.dataset_hash, report.dataset_hash);
    assert_eq!(again.signals, report.signals);
}

#[test]
fn synthetic_scan_is_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let opts = LoadOptions {
        offline: true,
        synthetic: true,
        start: NaiveDate::from_ymd_opt(2024, 1, 1),
        end: NaiveDate::from_ymd_opt(2024, 6, 28),
        ..Default::default()
    };

    let report = run_scan("SPY", &store, None, &ScanSettings::default(), &opts).unwrap();
    assert!(report.is_synthetic());
    assert!(report.stored_path.is_none());
    assert!(!store.contains("SPY"));
    assert!(matches!(report.outcome, ScanOutcome::Complete));
}

#[test]
fn missing_data_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let opts = LoadOptions {
        offline: true,
        ..Default::default()
    };

    let err = run_scan("NOPE", &store, None, &ScanSettings::default(), &opts).unwrap_err();
    match err {
        RunError::DataUnavailable { symbol, reason } => {
            assert_eq!(symbol, "NOPE");
            assert!(reason.contains("no stored data"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn clipped_scan_keeps_full_history_in_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let provider = StubProvider {
        closes: (0..10).map(|i| 100.0 + i as f64).collect(),
    };
    run_scan("ACME", &store, Some(&provider), &ScanSettings::default(), &LoadOptions::default()).unwrap();
    assert_eq!(store.load("ACME").unwrap().len(), 10);

    let clipped = LoadOptions {
        offline: true,
        start: NaiveDate::from_ymd_opt(2024, 3, 8),
        ..Default::default()
    };
    let report = run_scan("ACME", &store, None, &ScanSettings::default(), &clipped).unwrap();
    assert_eq!(report.augmented.len(), 3);
    assert_eq!(store.load("ACME").unwrap().len(), 10);

    let full = LoadOptions {
        offline: true,
        ..Default::default()
    };
    let again = run_scan("ACME", &store, None, &ScanSettings::default(), &full).unwrap();
    assert_eq!(again.augmented.len(), 10);
}

#[test]
fn lowercase_symbol_finds_stored_data() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let provider = StubProvider {
        closes: vec![100.0, 90.0, 91.0],
    };
    let first = run_scan("spy", &store, Some(&provider), &ScanSettings::default(), &LoadOptions::default()).unwrap();
    assert_eq!(first.symbol(), "SPY");
    assert!(store.contains("SPY"));

    let opts = LoadOptions {
        offline: true,
        ..Default::default()
    };
    let again = run_scan(" spy ", &store, None, &ScanSettings::default(), &opts).unwrap();
    assert_eq!(again.source, DataSource::Store);
    assert_eq!(again.augmented.len(), 3);
}

#[test]
fn order_is_built_from_a_stored_scan() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::new(dir.path());
    let provider = StubProvider {
        closes: vec![100.0, 90.0, 91.0, 92.0],
    };
    run_scan("ACME", &store, Some(&provider), &ScanSettings::default(), &LoadOptions::default()).unwrap();

    let opts = LoadOptions {
        offline: true,
        ..Default::default()
    };
    let report = run_scan("ACME", &store, None, &ScanSettings::default(), &opts).unwrap();
    let order = order_from_signal(&report, 0, 2.0, 0.1).unwrap();
    assert_eq!(order.symbol, "ACME");
    assert!((order.stop_loss - 81.0).abs() < 1e-9);

    assert!(matches!(
        order_from_signal(&report, 99, 2.0, 0.1),
        Err(RunError::NoSuchSignal { .. })
    ));
}
