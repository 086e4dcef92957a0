//! Bracket buy orders and their wire encoding.

use super::gateway::GatewayError;
use crate::signals::Signal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SIGNIFICANT_DIGITS: u32 = 12;

/// Market buy, good-till-canceled, with a take-profit limit and a stop-loss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub qty: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl OrderRequest {
    pub fn new(symbol: impl Into<String>, qty: f64, take_profit: f64, stop_loss: f64) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            take_profit,
            stop_loss,
        }
    }

    /// Take profit at the signal's projected sell price and stop out
    /// `stop_loss_fraction` below the trigger price.
    pub fn from_signal(symbol: impl Into<String>, signal: &Signal, qty: f64, stop_loss_fraction: f64) -> Self {
        Self::new(
            symbol,
            qty,
            signal.projected_sell_price,
            signal.trigger_price * (1.0 - stop_loss_fraction),
        )
    }

    /// The JSON body for a bracket order. All numbers are decimal strings.
    pub fn to_json(&self) -> Result<serde_json::Value, GatewayError> {
        Ok(serde_json::json!({
            "symbol": self.symbol,
            "qty": encode_decimal(self.qty)?,
            "side": "buy",
            "type": "market",
            "time_in_force": "gtc",
            "order_class": "bracket",
            "take_profit": { "limit_price": encode_decimal(self.take_profit)? },
            "stop_loss": { "stop_price": encode_decimal(self.stop_loss)? },
        }))
    }
}

/// Broker acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderAck {
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// Fixed-point decimal string rounded to 12 significant digits.
///
/// Never uses scientific notation; trailing zeros are stripped.
pub fn encode_decimal(value: f64) -> Result<String, GatewayError> {
    if !value.is_finite() {
        return Err(GatewayError::InvalidNumber { value });
    }
    let decimal = Decimal::from_str(&format!("{value}"))
        .ok()
        .and_then(|d| d.round_sf(SIGNIFICANT_DIGITS))
        .ok_or(GatewayError::InvalidNumber { value })?;
    Ok(decimal.normalize().to_string())
}
