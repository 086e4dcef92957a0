//! Company-name → ticker table.
//!
//! Stored on disk as a flat JSON object with lowercase company names as
//! keys: `{"apple inc": "AAPL", "microsoft corp": "MSFT"}`.

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("read company table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parse company table: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyTable {
    entries: BTreeMap<String, String>,
}

impl CompanyTable {
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, TableError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(content)?;
        Ok(Self::from_pairs(raw))
    }

    /// Build from (company, symbol) pairs. Company names are lowercased.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
            .collect();
        Self { entries }
    }

    /// Symbol for an exact (case-insensitive) company name.
    pub fn symbol_for(&self, company: &str) -> Option<&str> {
        self.entries
            .get(&company.trim().to_lowercase())
            .map(|s| s.as_str())
    }

    pub fn companies(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
