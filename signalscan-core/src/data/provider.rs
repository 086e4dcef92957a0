//! Data provider trait and structured error types.
//!
//! The `DataProvider` trait abstracts over market-data sources so the
//! loader can fall back between them and tests can substitute a fake.

use crate::domain::{Bar, Series, SeriesError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
///
/// Displayable in CLI output as-is.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("provider error for '{symbol}': {message}")]
    Provider { symbol: String, message: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("store error: {0}")]
    StoreError(String),

    #[error("no stored data for symbol '{symbol}' (run `download {symbol}` first)")]
    NoStoredData { symbol: String },

    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("bar for '{symbol}' on {date} is missing a value or has an inconsistent range")]
    InvalidBar { symbol: String, date: NaiveDate },

    #[error("data error: {0}")]
    Other(String),
}

/// Reject the first bar that fails [`Bar::is_sane`].
pub fn check_bars(symbol: &str, bars: &[Bar]) -> Result<(), DataError> {
    match bars.iter().find(|b| !b.is_sane()) {
        Some(bad) => Err(DataError::InvalidBar {
            symbol: symbol.to_string(),
            date: bad.date,
        }),
        None => Ok(()),
    }
}

/// A successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: Series,
    pub source: DataSource,
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    AlphaVantage,
    Store,
    Synthetic,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataSource::AlphaVantage => "alpha_vantage",
            DataSource::Store => "store",
            DataSource::Synthetic => "synthetic",
        };
        f.write_str(name)
    }
}

/// A source of daily bars.
///
/// Implementations return an ascending, duplicate-free series. The store
/// sits above this trait; providers don't know about it.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch every daily bar the provider offers for `symbol`.
    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError>;
}

/// Progress callback for multi-symbol downloads.
pub trait DownloadProgress: Send {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Prints progress to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, result: &Result<(), DataError>) {
        match result {
            Ok(()) => println!("  OK: {symbol}"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
