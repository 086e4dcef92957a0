//! Indicator engine: Series in, AugmentedSeries out.

use super::{Ewma, Indicator, LowerBand};
use crate::domain::{Bar, Series};
use serde::{Deserialize, Serialize};

/// Smoothing spans and band width. Defaults: fast 1, slow 3, band 2, width 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub band_span: usize,
    pub band_width: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_span: 1,
            slow_span: 3,
            band_span: 2,
            band_width: 2.0,
        }
    }
}

/// Derived values for one bar. NaN means undefined for that bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub fast_ma: f64,
    pub slow_ma: f64,
    pub lower_band: f64,
}

impl IndicatorRow {
    pub fn has_band(&self) -> bool {
        !self.lower_band.is_nan()
    }
}

/// A series together with its derived indicator columns.
///
/// Built only by [`compute_indicators`]; consumers read but never mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedSeries {
    series: Series,
    rows: Vec<IndicatorRow>,
    params: IndicatorParams,
}

impl AugmentedSeries {
    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn bars(&self) -> &[Bar] {
        self.series.bars()
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bars paired with their indicator rows, in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bar, &IndicatorRow)> {
        self.series.bars().iter().zip(self.rows.iter())
    }

    pub fn fast_ma(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.fast_ma).collect()
    }

    pub fn slow_ma(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.slow_ma).collect()
    }

    pub fn lower_band(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.lower_band).collect()
    }
}

/// Compute fast/slow EWMAs and the lower band for every bar.
///
/// Pure: the same series and params always yield bit-identical output.
pub fn compute_indicators(series: &Series, params: &IndicatorParams) -> AugmentedSeries {
    let bars = series.bars();
    let fast = Ewma::new(params.fast_span).compute(bars);
    let slow = Ewma::new(params.slow_span).compute(bars);
    let band = LowerBand::new(params.band_span, params.band_width).compute(bars);

    let rows = fast
        .into_iter()
        .zip(slow)
        .zip(band)
        .map(|((fast_ma, slow_ma), lower_band)| IndicatorRow {
            fast_ma,
            slow_ma,
            lower_band,
        })
        .collect();

    AugmentedSeries {
        series: series.clone(),
        rows,
        params: *params,
    }
}
