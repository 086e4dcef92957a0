//! Batch download: fetch each symbol, compute its indicators and store the flat file.

use super::provider::{DataError, DataProvider, DownloadProgress};
use super::store::SeriesStore;
use crate::domain::normalize_symbol;
use crate::indicators::{compute_indicators, IndicatorParams};

/// Download several symbols in order and write one flat file each.
///
/// Symbols are normalised to upper case. Symbols already in the store are
/// skipped unless `force` is set.
/// A failed symbol does not stop the batch.
pub fn download_symbols(
    provider: &dyn DataProvider,
    store: &SeriesStore,
    symbols: &[&str],
    params: &IndicatorParams,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, raw) in symbols.iter().enumerate() {
        let symbol = normalize_symbol(raw);
        let symbol = symbol.as_str();
        progress.on_start(symbol, i, total);

        if !force && store.contains(symbol) {
            tracing::info!(symbol, "already stored, skipping");
            progress.on_complete(symbol, i, total, &Ok(()));
            succeeded += 1;
            continue;
        }

        let result = download_single(provider, store, symbol, params);
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

fn download_single(
    provider: &dyn DataProvider,
    store: &SeriesStore,
    symbol: &str,
    params: &IndicatorParams,
) -> Result<(), DataError> {
    let fetched = provider.fetch(symbol)?;
    let augmented = compute_indicators(&fetched.series, params);
    store.write(&augmented)?;
    Ok(())
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{DataSource, FetchResult};
    use crate::domain::Series;
    use crate::indicators::make_bars;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        calls: AtomicUsize,
    }

    impl DataProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol == "FAIL" {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            let series = Series::new(symbol, make_bars(&[100.0, 101.0, 99.0])).unwrap();
            Ok(FetchResult {
                series,
                source: DataSource::AlphaVantage,
            })
        }
    }

    struct SilentProgress;

    impl DownloadProgress for SilentProgress {
        fn on_start(&self, _: &str, _: usize, _: usize) {}
        fn on_complete(&self, _: &str, _: usize, _: usize, _: &Result<(), DataError>) {}
        fn on_batch_complete(&self, _: usize, _: usize, _: usize) {}
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        let provider = FakeProvider {
            calls: AtomicUsize::new(0),
        };

        let summary = download_symbols(
            &provider,
            &store,
            &["SPY", "FAIL", "QQQ"],
            &IndicatorParams::default(),
            false,
            &SilentProgress,
        );

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.errors[0].0, "FAIL");
        assert!(store.contains("SPY"));
        assert!(store.contains("QQQ"));
    }

    #[test]
    fn lowercase_symbols_are_stored_uppercase() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        let provider = FakeProvider {
            calls: AtomicUsize::new(0),
        };

        let summary = download_symbols(
            &provider,
            &store,
            &["spy"],
            &IndicatorParams::default(),
            false,
            &SilentProgress,
        );

        assert!(summary.all_succeeded());
        assert!(store.contains("SPY"));
        assert!(!dir.path().join("Data-for-spy.csv").exists());
        assert_eq!(store.load("SPY").unwrap().symbol(), "SPY");
    }

    #[test]
    fn stored_symbols_are_skipped_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::new(dir.path());
        let provider = FakeProvider {
            calls: AtomicUsize::new(0),
        };
        let params = IndicatorParams::default();

        download_symbols(&provider, &store, &["SPY"], &params, false, &SilentProgress);
        download_symbols(&provider, &store, &["SPY"], &params, false, &SilentProgress);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let summary = download_symbols(&provider, &store, &["SPY"], &params, true, &SilentProgress);
        assert!(summary.all_succeeded());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
