//! Deterministic random-walk bars for offline demos.
//!
//! Seeded from the BLAKE3 hash of the symbol, so the same symbol and date
//! range always produce the same bars. Anything built on these bars is
//! tagged `DataSource::Synthetic`.

use crate::domain::{Bar, Series, SeriesError};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START_PRICE: f64 = 100.0;

/// Weekday bars from `start` to `end` inclusive, starting at 100.0.
pub fn generate_synthetic_series(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Series, SeriesError> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = START_PRICE;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    Series::new(symbol, bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_symbol_same_bars() {
        let a = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        let b = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_symbols_differ() {
        let a = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        let b = generate_synthetic_series("QQQ", d(2024, 1, 1), d(2024, 3, 1)).unwrap();
        assert_ne!(a.closes(), b.closes());
    }

    #[test]
    fn skips_weekends_and_bars_are_sane() {
        let s = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        // January 2024 has 23 weekdays
        assert_eq!(s.len(), 23);
        for bar in s.bars() {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.is_sane());
        }
        assert_eq!(s.bars()[0].open, START_PRICE);
    }

    #[test]
    fn weekend_only_range_is_empty_error() {
        // 2024-01-06 is a Saturday
        let err = generate_synthetic_series("SPY", d(2024, 1, 6), d(2024, 1, 7)).unwrap_err();
        assert!(matches!(err, SeriesError::Empty { .. }));
    }
}
