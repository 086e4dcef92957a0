//! Alpha Vantage daily-bar provider.
//!
//! Calls `TIME_SERIES_DAILY` and parses the `"Time Series (Daily)"` map.
//! The service reports failures in-band: HTTP 200 with an `"Error Message"`
//! key for bad symbols, or a `"Note"` / `"Information"` key when the key is
//! throttled. Transient HTTP failures are retried with exponential backoff.

use super::provider::{check_bars, DataError, DataProvider, DataSource, FetchResult};
use crate::domain::{Bar, Series};
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// How much history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 bars.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<BTreeMap<String, DailyQuote>>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    api_key: SecretString,
    output_size: OutputSize,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl AlphaVantageProvider {
    pub fn new(api_key: SecretString, output_size: OutputSize) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            output_size,
            base_url: BASE_URL.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the provider at a different host (e.g. a local mirror).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Parse a `TIME_SERIES_DAILY` body into an ascending series.
    pub fn parse_response(symbol: &str, body: &str) -> Result<Series, DataError> {
        let resp: DailyResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        if let Some(message) = resp.error_message {
            return Err(DataError::Provider {
                symbol: symbol.to_string(),
                message,
            });
        }
        if let Some(notice) = resp.note.or(resp.information) {
            return Err(DataError::RateLimited(notice));
        }

        let quotes = resp
            .time_series
            .ok_or_else(|| DataError::ResponseFormatChanged("no \"Time Series (Daily)\" key".into()))?;
        if quotes.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars = quotes
            .into_iter()
            .map(|(day, quote)| parse_quote(&day, &quote))
            .collect::<Result<Vec<_>, _>>()?;
        check_bars(symbol, &bars)?;

        Ok(Series::from_unordered(symbol, bars)?)
    }

    fn fetch_with_retry(&self, symbol: &str) -> Result<Series, DataError> {
        let query = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", self.output_size.as_str()),
            ("apikey", self.api_key.expose_secret()),
        ];
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(symbol, attempt, ?delay, "retrying daily-bar request");
                std::thread::sleep(delay);
            }

            match self.client.get(&self.base_url).query(&query).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(DataError::RateLimited(format!("HTTP {status}")));
                        continue;
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                        return Err(DataError::AuthenticationRequired(format!(
                            "HTTP {status} from Alpha Vantage"
                        )));
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let body = resp
                        .text()
                        .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
                    return Self::parse_response(symbol, &body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    fn fetch(&self, symbol: &str) -> Result<FetchResult, DataError> {
        let series = self.fetch_with_retry(symbol)?;
        tracing::info!(
            symbol,
            bars = series.len(),
            first = %series.first_date(),
            last = %series.last_date(),
            "fetched daily bars"
        );
        Ok(FetchResult {
            series,
            source: DataSource::AlphaVantage,
        })
    }
}

fn parse_quote(day: &str, quote: &DailyQuote) -> Result<Bar, DataError> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DataError::ResponseFormatChanged(format!("invalid date '{day}': {e}")))?;
    let field = |name: &str, raw: &str| {
        raw.trim().parse::<f64>().map_err(|e| {
            DataError::ResponseFormatChanged(format!("invalid {name} '{raw}' on {day}: {e}"))
        })
    };
    Ok(Bar {
        date,
        open: field("open", &quote.open)?,
        high: field("high", &quote.high)?,
        low: field("low", &quote.low)?,
        close: field("close", &quote.close)?,
        volume: field("volume", &quote.volume)?,
    })
}
