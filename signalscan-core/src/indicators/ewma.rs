//! Exponentially-weighted moving average of close.
//!
//! Non-adjusted recursion seeded with the first close, so every bar has a
//! value (no warmup). Span 1 degenerates to the close itself.

use super::ewm::EwmMean;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ewma {
    span: usize,
    name: String,
}

impl Ewma {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EWMA span must be >= 1");
        Self {
            span,
            name: format!("ewma_{span}"),
        }
    }

    pub fn span(&self) -> usize {
        self.span
    }
}

impl Indicator for Ewma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut acc = EwmMean::with_span(self.span);
        bars.iter().map(|bar| acc.update(bar.close)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn span_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ewma::new(1).compute(&bars);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn span_3_known_values() {
        // alpha = 0.5
        // [10, 11, 12, 13] → 10, 10.5, 11.25, 12.125
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let result = Ewma::new(3).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn constant_input_constant_output() {
        let bars = make_bars(&[100.0, 100.0, 100.0]);
        for span in [1, 2, 3, 20] {
            let result = Ewma::new(span).compute(&bars);
            assert!(result.iter().all(|&v| v == 100.0), "span {span}: {result:?}");
        }
    }

    #[test]
    fn no_lookahead_truncated_matches_full() {
        let bars = make_bars(&[10.0, 14.0, 9.0, 11.0, 15.0, 12.0]);
        let ewma = Ewma::new(3);
        let full = ewma.compute(&bars);
        let truncated = ewma.compute(&bars[..4]);
        assert_eq!(&full[..4], truncated.as_slice());
    }

    #[test]
    fn name_includes_span() {
        assert_eq!(Ewma::new(3).name(), "ewma_3");
        assert_eq!(Ewma::new(3).lookback(), 0);
    }

    #[test]
    #[should_panic(expected = "span must be >= 1")]
    fn zero_span_rejected() {
        Ewma::new(0);
    }
}
