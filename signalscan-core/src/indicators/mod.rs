//! Indicator engine.
//!
//! Indicators are pure functions of a bar series: bars in, one value per bar
//! out. They are computed once per run by [`compute_indicators`] and cached
//! alongside the series as an [`AugmentedSeries`].

pub mod engine;
pub mod ewm;
pub mod ewma;
pub mod lower_band;

pub use engine::{compute_indicators, AugmentedSeries, IndicatorParams, IndicatorRow};
pub use ewm::{alpha_for_span, EwmMean, EwmMoments};
pub use ewma::Ewma;
pub use lower_band::LowerBand;

use crate::domain::Bar;

/// Trait for indicators.
///
/// `compute` returns a `Vec<f64>` of the same length as `bars`. Values that
/// are undefined for a bar (e.g. a variance over a single sample) are NaN.
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "ewma_3").
    fn name(&self) -> &str;

    /// Number of leading bars whose value is always undefined.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev close (or close for the first bar), high/low = max/min of
/// open and close +/- 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::Series {
    crate::domain::Series::new("TEST", make_bars(closes)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
