//! signalscan runner: loads a symbol's bars, runs the scan and renders the chart.
//!
//! - Data loading with store/download/synthetic fallback
//! - Scan pipeline producing a report with the full or partial signal log
//! - Plotly HTML chart of bars, indicators and signals

pub mod chart;
pub mod data_loader;
pub mod pipeline;

pub use chart::{ChartError, ChartRenderer, HtmlChart};
pub use data_loader::{load_series, LoadError, LoadOptions, LoadedData};
pub use pipeline::{order_from_signal, run_scan, scan_series, RunError, ScanOutcome, ScanReport, ScanSettings};

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<ScanReport>();
        require_sync::<ScanReport>();
        require_send::<ScanOutcome>();
        require_sync::<ScanOutcome>();
        require_send::<LoadedData>();
        require_sync::<LoadedData>();
        require_send::<LoadOptions>();
        require_sync::<LoadOptions>();
    }
}
