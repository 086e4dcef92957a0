//! The two threshold buy rules.
//!
//! Both fire when close has fallen to `discount` times a reference level
//! or lower:
//! - [`MovingAverageDip`]: reference is the slow moving average.
//! - [`BollingerDip`]: reference is the lower band; bars without a band
//!   never fire.

use super::{BuyRule, MissingValue, Strategy};
use crate::domain::Bar;
use crate::indicators::IndicatorRow;

#[derive(Debug, Clone)]
pub struct MovingAverageDip {
    discount: f64,
}

impl MovingAverageDip {
    pub fn new(discount: f64) -> Self {
        Self { discount }
    }
}

impl BuyRule for MovingAverageDip {
    fn name(&self) -> &str {
        "moving_average_dip"
    }

    fn strategy(&self) -> Strategy {
        Strategy::MovingAverage
    }

    fn evaluate(&self, bar: &Bar, row: &IndicatorRow) -> Result<bool, MissingValue> {
        if bar.close.is_nan() {
            return Err(MissingValue { field: "close" });
        }
        if row.slow_ma.is_nan() {
            return Err(MissingValue { field: "slow_ma" });
        }
        Ok(self.discount * row.slow_ma >= bar.close)
    }
}

#[derive(Debug, Clone)]
pub struct BollingerDip {
    discount: f64,
}

impl BollingerDip {
    pub fn new(discount: f64) -> Self {
        Self { discount }
    }
}

impl BuyRule for BollingerDip {
    fn name(&self) -> &str {
        "bollinger_dip"
    }

    fn strategy(&self) -> Strategy {
        Strategy::BollingerBand
    }

    fn evaluate(&self, bar: &Bar, row: &IndicatorRow) -> Result<bool, MissingValue> {
        if bar.close.is_nan() {
            return Err(MissingValue { field: "close" });
        }
        if !row.has_band() {
            return Ok(false);
        }
        Ok(self.discount * row.lower_band >= bar.close)
    }
}
