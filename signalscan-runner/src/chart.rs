//! Chart rendering.
//!
//! `HtmlChart` writes a standalone page with a Plotly figure: candlesticks,
//! the three indicator lines and, when there are signals, buy and
//! projected-sell markers. plotly.js is loaded from its CDN.

use serde_json::{json, Value};
use signalscan_core::indicators::AugmentedSeries;
use signalscan_core::signals::SignalLog;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to write chart {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode figure: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Turns a scanned series into a viewable artifact. Inputs are not modified.
pub trait ChartRenderer {
    fn render(&self, symbol: &str, augmented: &AugmentedSeries, signals: &SignalLog) -> Result<PathBuf, ChartError>;
}

pub struct HtmlChart {
    out_dir: PathBuf,
}

impl HtmlChart {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }

    /// `{out_dir}/Stock_data_for-{SYMBOL}.html`
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.out_dir.join(format!("Stock_data_for-{symbol}.html"))
    }
}

impl ChartRenderer for HtmlChart {
    fn render(&self, symbol: &str, augmented: &AugmentedSeries, signals: &SignalLog) -> Result<PathBuf, ChartError> {
        let figure = build_figure(symbol, augmented, signals);
        let page = html_page(symbol, &figure)?;

        let path = self.path_for(symbol);
        write_file(&self.out_dir, &path, &page)?;
        tracing::info!(symbol, path = %path.display(), "chart written");
        Ok(path)
    }
}

fn write_file(dir: &Path, path: &Path, content: &str) -> Result<(), ChartError> {
    let io_err = |source| ChartError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(path, content).map_err(io_err)
}

fn defined(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(|v| (!v.is_nan()).then_some(v)).collect()
}

fn line(name: &str, color: &str, x: &[String], y: Vec<f64>) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines",
        "name": name,
        "x": x,
        "y": defined(y),
        "line": { "color": color, "shape": "spline" },
    })
}

/// The Plotly figure (`data` + `layout`) for one symbol.
pub fn build_figure(symbol: &str, augmented: &AugmentedSeries, signals: &SignalLog) -> Value {
    let bars = augmented.bars();
    let dates: Vec<String> = bars.iter().map(|b| b.date.to_string()).collect();

    let mut data = vec![
        json!({
            "type": "candlestick",
            "name": "Candlesticks",
            "x": dates,
            "open": bars.iter().map(|b| b.open).collect::<Vec<_>>(),
            "high": bars.iter().map(|b| b.high).collect::<Vec<_>>(),
            "low": bars.iter().map(|b| b.low).collect::<Vec<_>>(),
            "close": bars.iter().map(|b| b.close).collect::<Vec<_>>(),
        }),
        line("Slow MA", "rgba(0, 255, 0, .8)", &dates, augmented.slow_ma()),
        line("Fast MA", "rgba(0, 0, 255, .8)", &dates, augmented.fast_ma()),
        line("Lower Bollinger Band", "rgba(255, 0, 0, .8)", &dates, augmented.lower_band()),
    ];

    if !signals.is_empty() {
        let signal_dates: Vec<String> = signals.iter().map(|s| s.date.to_string()).collect();
        data.push(json!({
            "type": "scatter",
            "mode": "markers",
            "name": "Buy Signals",
            "x": signal_dates,
            "y": signals.iter().map(|s| s.trigger_price).collect::<Vec<_>>(),
            "text": signals.iter().map(|s| s.strategy.label()).collect::<Vec<_>>(),
            "marker": { "symbol": "triangle-up", "size": 10 },
        }));
        data.push(json!({
            "type": "scatter",
            "mode": "markers",
            "name": "Sell Signals",
            "x": signal_dates,
            "y": signals.iter().map(|s| s.projected_sell_price).collect::<Vec<_>>(),
            "marker": { "symbol": "triangle-down", "size": 10 },
        }));
    }

    json!({
        "data": data,
        "layout": {
            "title": { "text": format!("Data for {symbol}") },
            "yaxis": { "title": { "text": "Stock Price (USD per Share)" } },
            "xaxis": { "rangeslider": { "visible": false } },
        },
    })
}

fn html_page(symbol: &str, figure: &Value) -> Result<String, ChartError> {
    // keep "</script>" inside string data from closing the tag
    let figure_json = serde_json::to_string(figure)?.replace("</", "<\\/");
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{symbol}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
var figure = {figure_json};
Plotly.newPlot("chart", figure.data, figure.layout);
</script>
</body>
</html>
"#
    ))
}
