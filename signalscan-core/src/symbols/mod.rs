//! Company-name to ticker resolution.
//!
//! The company table is loaded once at startup and passed in; nothing here
//! holds global state.

pub mod resolver;
pub mod similarity;
pub mod table;

pub use resolver::{Resolution, ResolveError, SymbolResolver};
pub use similarity::{closest_matches, similarity_ratio, Match};
pub use table::{CompanyTable, TableError};
