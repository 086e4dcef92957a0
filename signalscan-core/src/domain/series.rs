//! Ascending, duplicate-free bars for one symbol.

use super::bar::Bar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series for '{symbol}' has no bars")]
    Empty { symbol: String },

    #[error("bars for '{symbol}' are not ascending at {date} (index {index})")]
    NotAscending {
        symbol: String,
        index: usize,
        date: NaiveDate,
    },

    #[error("duplicate bar for '{symbol}' on {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

/// Ordered bars for a single symbol.
///
/// Invariants (enforced on construction): at least one bar, dates strictly
/// increasing. Once built the series is read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series from bars that must already be in ascending date order.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        for (i, pair) in bars.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.date == prev.date {
                return Err(SeriesError::DuplicateDate {
                    symbol,
                    date: next.date,
                });
            }
            if next.date < prev.date {
                return Err(SeriesError::NotAscending {
                    symbol,
                    index: i + 1,
                    date: next.date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    /// Sort bars by date and keep the last bar seen for any repeated date.
    ///
    /// Providers hand back bars newest-first and occasionally repeat a day;
    /// this is the normalising entry point for raw provider output.
    pub fn from_unordered(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, SeriesError> {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self::new(symbol, deduped)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    /// Close prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Keep only bars whose date falls within `[start, end]` (either bound optional).
    pub fn clip(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, SeriesError> {
        let bars = self
            .bars
            .iter()
            .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
            .cloned()
            .collect();
        Self::new(self.symbol.clone(), bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn empty_series_rejected() {
        let err = Series::new("SPY", vec![]).unwrap_err();
        assert!(matches!(err, SeriesError::Empty { .. }));
    }

    #[test]
    fn descending_series_rejected() {
        let err = Series::new("SPY", vec![bar(3, 1.0), bar(2, 1.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NotAscending { index: 1, .. }));
    }

    #[test]
    fn duplicate_date_rejected() {
        let err = Series::new("SPY", vec![bar(2, 1.0), bar(2, 2.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::DuplicateDate { .. }));
    }

    #[test]
    fn from_unordered_sorts_and_keeps_last_duplicate() {
        let series =
            Series::from_unordered("SPY", vec![bar(4, 4.0), bar(2, 2.0), bar(4, 40.0), bar(3, 3.0)])
                .unwrap();
        assert_eq!(series.closes(), vec![2.0, 3.0, 40.0]);
    }

    #[test]
    fn clip_filters_inclusive_bounds() {
        let series = Series::new("SPY", vec![bar(2, 2.0), bar(3, 3.0), bar(4, 4.0)]).unwrap();
        let clipped = series
            .clip(NaiveDate::from_ymd_opt(2024, 1, 3), NaiveDate::from_ymd_opt(2024, 1, 4))
            .unwrap();
        assert_eq!(clipped.closes(), vec![3.0, 4.0]);
        assert_eq!(clipped.first_date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn clip_to_nothing_is_an_error() {
        let series = Series::new("SPY", vec![bar(2, 2.0)]).unwrap();
        assert!(series.clip(NaiveDate::from_ymd_opt(2025, 1, 1), None).is_err());
    }
}
