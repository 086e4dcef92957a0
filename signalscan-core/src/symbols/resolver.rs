//! Fuzzy resolution of free text to a ticker, with an operator prompt loop.

use super::similarity::{closest_matches, Match};
use super::table::CompanyTable;
use std::io::{BufRead, Write};
use thiserror::Error;

/// Default number of candidates considered.
pub const DEFAULT_MAX_CANDIDATES: usize = 3;

/// Default minimum similarity for a candidate.
pub const DEFAULT_CUTOFF: f64 = 0.6;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("prompt I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("input closed before a company was confirmed")]
    Aborted,
}

/// A confirmed company and its ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub company: String,
    pub symbol: String,
    pub score: f64,
}

pub struct SymbolResolver {
    table: CompanyTable,
    max_candidates: usize,
    cutoff: f64,
}

impl SymbolResolver {
    pub fn new(table: CompanyTable) -> Self {
        Self {
            table,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            cutoff: DEFAULT_CUTOFF,
        }
    }

    pub fn table(&self) -> &CompanyTable {
        &self.table
    }

    /// Close matches for free text, best first.
    pub fn candidates(&self, query: &str) -> Vec<Match> {
        let query = query.trim().to_lowercase();
        closest_matches(&query, self.table.companies(), self.max_candidates, self.cutoff)
    }

    /// The single best match, resolved to its symbol.
    pub fn propose(&self, query: &str) -> Option<Resolution> {
        self.candidates(query)
            .into_iter()
            .next()
            .and_then(|m| self.to_resolution(m))
    }

    /// Prompt until the operator confirms a proposed company.
    ///
    /// Reads lines from `input` and writes prompts to `output`. Returns
    /// [`ResolveError::Aborted`] when input ends first.
    pub fn resolve_interactive<R, W>(&self, input: &mut R, output: &mut W) -> Result<Resolution, ResolveError>
    where
        R: BufRead,
        W: Write,
    {
        loop {
            write!(output, "Search for a business: ")?;
            output.flush()?;
            let query = read_line(input)?.ok_or(ResolveError::Aborted)?;

            if let Some(proposal) = self.propose(&query) {
                write!(output, "Do you mean {}? yes(y) or no(n): ", proposal.company)?;
                output.flush()?;
                let answer = read_line(input)?.ok_or(ResolveError::Aborted)?;
                if answer.trim().to_lowercase().starts_with('y') {
                    tracing::info!(company = %proposal.company, symbol = %proposal.symbol, "resolved company");
                    return Ok(proposal);
                }
            } else {
                tracing::debug!(query = query.trim(), "no close match");
            }

            writeln!(output, "Care to try again? ")?;
        }
    }

    fn to_resolution(&self, m: Match) -> Option<Resolution> {
        let symbol = self.table.symbol_for(&m.candidate)?.to_string();
        Some(Resolution {
            company: m.candidate,
            symbol,
            score: m.score,
        })
    }
}

/// One line without its terminator; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, std::io::Error> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
