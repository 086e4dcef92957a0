//! Flat-file store: one CSV per symbol.
//!
//! Layout: `{data_dir}/Data-for-{SYMBOL}.csv` with columns
//! `Time,Open,High,Low,Close,Volume,Fast MA,Slow MA,LBB`. Undefined
//! indicator values are written as empty cells.
//!
//! - Atomic writes (write to .tmp, rename into place)
//! - Loading reads the bar columns only; indicators are always recomputed
//! - Files that fail to parse are quarantined (`.csv.quarantined`)

use super::provider::{check_bars, DataError};
use crate::domain::{Bar, Series};
use crate::indicators::AugmentedSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "Data-for-";
const FILE_EXT: &str = "csv";

#[derive(Debug, Serialize)]
struct AugmentedRow {
    #[serde(rename = "Time")]
    time: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
    #[serde(rename = "Fast MA")]
    fast_ma: Option<f64>,
    #[serde(rename = "Slow MA")]
    slow_ma: Option<f64>,
    #[serde(rename = "LBB")]
    lower_band: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct BarRow {
    #[serde(rename = "Time")]
    time: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Summary of one stored symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSymbol {
    pub symbol: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub bar_count: usize,
    pub size_bytes: u64,
}

pub struct SeriesStore {
    data_dir: PathBuf,
}

impl SeriesStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `{data_dir}/Data-for-{SYMBOL}.csv`
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{FILE_PREFIX}{symbol}.{FILE_EXT}"))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.path_for(symbol).is_file()
    }

    /// Write a symbol's bars and indicator columns, replacing any previous file.
    pub fn write(&self, augmented: &AugmentedSeries) -> Result<PathBuf, DataError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| DataError::StoreError(format!("failed to create dir: {e}")))?;

        let path = self.path_for(augmented.symbol());
        let tmp_path = path.with_extension("csv.tmp");

        write_csv(augmented, &tmp_path)?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::StoreError(format!("atomic rename failed: {e}"))
        })?;

        tracing::info!(symbol = augmented.symbol(), path = %path.display(), bars = augmented.len(), "stored series");
        Ok(path)
    }

    /// Load the stored bars for a symbol.
    pub fn load(&self, symbol: &str) -> Result<Series, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::NoStoredData {
                symbol: symbol.to_string(),
            });
        }

        match read_csv(symbol, &path) {
            Ok(series) => Ok(series),
            Err(e) => {
                let quarantine = path.with_extension("csv.quarantined");
                tracing::warn!(path = %path.display(), "quarantining unreadable data file: {e}");
                let _ = fs::rename(&path, &quarantine);
                Err(DataError::NoStoredData {
                    symbol: symbol.to_string(),
                })
            }
        }
    }

    /// Every readable stored symbol, sorted by symbol.
    pub fn status(&self) -> Result<Vec<StoredSymbol>, DataError> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| DataError::StoreError(format!("read dir: {e}")))?;

        let mut stored = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::StoreError(format!("dir entry: {e}")))?;
            let path = entry.path();
            let Some(symbol) = symbol_from_path(&path) else {
                continue;
            };
            match read_csv(&symbol, &path) {
                Ok(series) => stored.push(StoredSymbol {
                    symbol,
                    first_date: series.first_date(),
                    last_date: series.last_date(),
                    bar_count: series.len(),
                    size_bytes: entry.metadata().map(|m| m.len()).unwrap_or(0),
                }),
                Err(e) => tracing::warn!(path = %path.display(), "skipping unreadable data file: {e}"),
            }
        }
        stored.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(stored)
    }
}

fn symbol_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXT) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(FILE_PREFIX).map(str::to_string)
}

fn defined(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

fn write_csv(augmented: &AugmentedSeries, path: &Path) -> Result<(), DataError> {
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| DataError::StoreError(format!("create file: {e}")))?;
    for (bar, row) in augmented.iter() {
        writer
            .serialize(AugmentedRow {
                time: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                fast_ma: defined(row.fast_ma),
                slow_ma: defined(row.slow_ma),
                lower_band: defined(row.lower_band),
            })
            .map_err(|e| DataError::StoreError(format!("write row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| DataError::StoreError(format!("flush: {e}")))
}

fn read_csv(symbol: &str, path: &Path) -> Result<Series, DataError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| DataError::StoreError(format!("open: {e}")))?;
    let bars = reader
        .deserialize::<BarRow>()
        .map(|row| {
            row.map(|r| Bar {
                date: r.time,
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
            })
            .map_err(|e| DataError::StoreError(format!("read row: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_bars(symbol, &bars)?;
    Ok(Series::new(symbol, bars)?)
}
