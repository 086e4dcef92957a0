//! Single-pass exponentially-weighted accumulators.
//!
//! Non-adjusted weighting: for span `s`, `alpha = 2 / (s + 1)`,
//! `mean[0] = x[0]`, `mean[i] = alpha * x[i] + (1 - alpha) * mean[i-1]`.
//!
//! [`EwmMoments`] tracks the mean together with a bias-corrected
//! exponentially-weighted variance driven by the same alpha. The weights
//! are renormalised after every observation, and the variance is scaled by
//! `(sum w)^2 / ((sum w)^2 - sum w^2)`. With a single observation that
//! denominator is zero and the variance is undefined (NaN).
//!
//! NaN inputs are not skipped: once a NaN is observed every later output
//! of that accumulator is NaN.

/// Smoothing factor for an EWM with the given span.
pub fn alpha_for_span(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Exponentially-weighted mean.
#[derive(Debug, Clone)]
pub struct EwmMean {
    alpha: f64,
    value: Option<f64>,
}

impl EwmMean {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    pub fn with_span(span: usize) -> Self {
        Self::new(alpha_for_span(span))
    }

    /// Feed the next observation and return the updated mean.
    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.value {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// Exponentially-weighted mean and bias-corrected variance.
#[derive(Debug, Clone)]
pub struct EwmMoments {
    alpha: f64,
    mean: f64,
    cov: f64,
    sum_wt: f64,
    sum_wt2: f64,
    old_wt: f64,
    nobs: usize,
}

impl EwmMoments {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            mean: f64::NAN,
            cov: f64::NAN,
            sum_wt: 0.0,
            sum_wt2: 0.0,
            old_wt: 0.0,
            nobs: 0,
        }
    }

    pub fn with_span(span: usize) -> Self {
        Self::new(alpha_for_span(span))
    }

    /// Feed the next observation.
    pub fn update(&mut self, x: f64) {
        if self.nobs == 0 {
            self.mean = x;
            self.cov = 0.0;
            self.sum_wt = 1.0;
            self.sum_wt2 = 1.0;
            self.old_wt = 1.0;
            self.nobs = 1;
            return;
        }

        let new_wt = self.alpha;
        let decay = 1.0 - self.alpha;
        self.old_wt *= decay;
        self.sum_wt *= decay;
        self.sum_wt2 *= decay * decay;

        let old_mean = self.mean;
        let total_wt = self.old_wt + new_wt;
        self.mean = (self.old_wt * old_mean + new_wt * x) / total_wt;
        let shift = old_mean - self.mean;
        let dev = x - self.mean;
        self.cov = (self.old_wt * (self.cov + shift * shift) + new_wt * dev * dev) / total_wt;

        self.sum_wt += new_wt;
        self.sum_wt2 += new_wt * new_wt;
        self.old_wt += new_wt;
        // Renormalise so the running weights stay bounded.
        self.sum_wt /= self.old_wt;
        self.sum_wt2 /= self.old_wt * self.old_wt;
        self.old_wt = 1.0;
        self.nobs += 1;
    }

    /// Current mean (NaN before the first observation).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Bias-corrected variance; NaN when fewer than two effective samples.
    pub fn variance(&self) -> f64 {
        if self.nobs == 0 {
            return f64::NAN;
        }
        let numerator = self.sum_wt * self.sum_wt;
        let denominator = numerator - self.sum_wt2;
        if denominator > 0.0 {
            numerator / denominator * self.cov
        } else {
            f64::NAN
        }
    }

    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn observations(&self) -> usize {
        self.nobs
    }
}
