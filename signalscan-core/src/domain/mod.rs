//! Domain types: daily bars and validated series.

pub mod bar;
pub mod series;

pub use bar::Bar;
pub use series::{Series, SeriesError};

/// Canonical ticker form used for store file names and API calls.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_trimmed_and_uppercased() {
        assert_eq!(normalize_symbol("spy"), "SPY");
        assert_eq!(normalize_symbol(" brk.b\n"), "BRK.B");
        assert_eq!(normalize_symbol("QQQ"), "QQQ");
    }
}
