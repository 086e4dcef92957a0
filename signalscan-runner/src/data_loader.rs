//! Series loading for a scan.
//!
//! Fallback policy:
//! 1. If the store has the symbol (and `force` is off) → use it
//! 2. Else, unless offline, fetch from the provider
//! 3. Else, if `synthetic` is set → generate synthetic bars (tagged)
//! 4. Otherwise → fail
//!
//! The loaded series is clipped to the requested date range and hashed so
//! a report can name exactly which bars it was computed from.

use chrono::{Duration, Local, NaiveDate};
use signalscan_core::data::{generate_synthetic_series, DataError, DataProvider, DataSource, SeriesStore};
use signalscan_core::domain::{Series, SeriesError};
use thiserror::Error;

/// Synthetic runs without a start date cover this many days.
const SYNTHETIC_DEFAULT_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no stored data for '{symbol}' and no network access (use --synthetic for synthetic data)")]
    NoStoredDataOffline { symbol: String },

    #[error("no stored data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("no bars for '{symbol}' in the requested range")]
    EmptyRange { symbol: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// First bar to keep (inclusive).
    pub start: Option<NaiveDate>,
    /// Last bar to keep (inclusive).
    pub end: Option<NaiveDate>,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
    /// Ignore the store and fetch again.
    pub force: bool,
}

#[derive(Debug)]
pub struct LoadedData {
    /// Bars within the requested range.
    pub series: Series,
    /// Every bar the source returned, before clipping.
    pub history: Series,
    pub source: DataSource,
    /// BLAKE3 over the symbol and every bar, hex encoded.
    pub dataset_hash: String,
}

/// Load one symbol's bars according to the fallback policy.
pub fn load_series(
    symbol: &str,
    store: &SeriesStore,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let (history, source) = resolve_source(symbol, store, provider, opts)?;
    let series = history.clip(opts.start, opts.end).map_err(|e| match e {
        SeriesError::Empty { symbol } => LoadError::EmptyRange { symbol },
        other => LoadError::Series(other),
    })?;
    let dataset_hash = compute_dataset_hash(&series);

    Ok(LoadedData {
        series,
        history,
        source,
        dataset_hash,
    })
}

fn resolve_source(
    symbol: &str,
    store: &SeriesStore,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<(Series, DataSource), LoadError> {
    if !opts.force {
        match store.load(symbol) {
            Ok(series) => {
                tracing::info!(symbol, bars = series.len(), "loaded from store");
                return Ok((series, DataSource::Store));
            }
            Err(DataError::NoStoredData { .. }) => {}
            Err(e) => tracing::warn!(symbol, "store read failed: {e}"),
        }
    }

    let mut failure = None;
    if !opts.offline {
        match provider {
            Some(prov) => match prov.fetch(symbol) {
                Ok(fetched) => return Ok((fetched.series, fetched.source)),
                Err(e) => {
                    tracing::warn!(symbol, provider = prov.name(), "fetch failed: {e}");
                    failure = Some(e.to_string());
                }
            },
            None => failure = Some("no data provider configured".to_string()),
        }
    }

    if opts.synthetic {
        tracing::warn!(symbol, "generating synthetic data; results are tagged synthetic");
        let end = opts.end.unwrap_or_else(|| Local::now().date_naive());
        let start = opts.start.unwrap_or(end - Duration::days(SYNTHETIC_DEFAULT_DAYS));
        let series = generate_synthetic_series(symbol, start, end)?;
        return Ok((series, DataSource::Synthetic));
    }

    match failure {
        Some(reason) => Err(LoadError::DownloadFailed {
            symbol: symbol.to_string(),
            reason,
        }),
        None => Err(LoadError::NoStoredDataOffline {
            symbol: symbol.to_string(),
        }),
    }
}

/// Deterministic BLAKE3 hash over the symbol, dates and OHLCV values.
pub fn compute_dataset_hash(series: &Series) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
