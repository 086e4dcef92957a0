//! Market data: provider trait, Alpha Vantage adapter, flat-file store,
//! synthetic fallback and batch download.

pub mod alpha_vantage;
pub mod download;
pub mod provider;
pub mod store;
pub mod synthetic;

pub use alpha_vantage::{AlphaVantageProvider, OutputSize};
pub use download::{download_symbols, DownloadSummary};
pub use provider::{DataError, DataProvider, DataSource, DownloadProgress, FetchResult, StdoutProgress};
pub use store::{SeriesStore, StoredSymbol};
pub use synthetic::generate_synthetic_series;
