//! Lower Bollinger band over exponentially-weighted moments of close.
//!
//! `lower[i] = ewm_mean[i] - width * ewm_std[i]`, with mean and std from
//! the same [`EwmMoments`] accumulator. The first bar has no variance and
//! so no band.

use super::ewm::EwmMoments;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct LowerBand {
    span: usize,
    width: f64,
    name: String,
}

impl LowerBand {
    pub fn new(span: usize, width: f64) -> Self {
        assert!(span >= 1, "band span must be >= 1");
        assert!(
            width > 0.0 && width.is_finite(),
            "band width must be positive and finite"
        );
        Self {
            span,
            width,
            name: format!("lower_band_{span}_{width}"),
        }
    }
}

impl Indicator for LowerBand {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut acc = EwmMoments::with_span(self.span);
        bars.iter()
            .map(|bar| {
                acc.update(bar.close);
                acc.mean() - self.width * acc.std()
            })
            .collect()
    }
}
