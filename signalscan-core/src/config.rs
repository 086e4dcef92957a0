//! Application configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) yields the stock setup. Secrets never live here: API
//! keys come from the environment.

use crate::data::OutputSize;
use crate::indicators::IndicatorParams;
use crate::signals::SignalParams;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "signalscan.toml";
pub const ALPHAVANTAGE_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub indicators: IndicatorParams,
    pub signals: SignalParams,
    pub data: DataConfig,
    pub broker: BrokerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the per-symbol flat files.
    pub data_dir: PathBuf,
    /// JSON map of lowercase company name to ticker.
    pub companies_file: PathBuf,
    pub output_size: OutputSize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            companies_file: PathBuf::from("companies-symbols/companies.json"),
            output_size: OutputSize::Compact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub endpoint: String,
    /// Stop-loss distance below the trigger price, as a fraction.
    pub stop_loss_fraction: f64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://paper-api.alpaca.markets".to_string(),
            stop_loss_fraction: 0.05,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `signalscan.toml` if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        for (name, span) in [
            ("fast_span", ind.fast_span),
            ("slow_span", ind.slow_span),
            ("band_span", ind.band_span),
        ] {
            if span < 1 {
                return Err(ConfigError::Invalid(format!("indicators.{name} must be >= 1")));
            }
        }
        if !(ind.band_width.is_finite() && ind.band_width > 0.0) {
            return Err(ConfigError::Invalid("indicators.band_width must be finite and > 0".into()));
        }

        let sig = &self.signals;
        if !(sig.buy_discount > 0.0 && sig.buy_discount <= 1.0) {
            return Err(ConfigError::Invalid("signals.buy_discount must be in (0, 1]".into()));
        }
        if !(sig.projected_gain.is_finite() && sig.projected_gain > 0.0) {
            return Err(ConfigError::Invalid("signals.projected_gain must be finite and > 0".into()));
        }

        let frac = self.broker.stop_loss_fraction;
        if !(frac > 0.0 && frac < 1.0) {
            return Err(ConfigError::Invalid("broker.stop_loss_fraction must be in (0, 1)".into()));
        }
        Ok(())
    }
}

/// Read a secret from the environment. Empty values count as unset.
pub fn secret_from_env(var: &str) -> Result<SecretString, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingEnv(var.to_string())),
    }
}
