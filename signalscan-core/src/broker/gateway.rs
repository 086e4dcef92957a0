//! The order-gateway seam.
//!
//! Fire-and-forget: every call is a single request with no retry and no
//! rollback. Callers decide what to do with a failure.

use super::order::{OrderAck, OrderRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("order {order_id} is not cancelable")]
    NotCancelable { order_id: String },

    #[error("broker rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("cannot encode {value} as a decimal string")]
    InvalidNumber { value: f64 },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// A broker that accepts bracket buy orders.
pub trait OrderGateway {
    fn submit(&self, order: &OrderRequest) -> Result<OrderAck, GatewayError>;

    fn cancel(&self, order_id: &str) -> Result<(), GatewayError>;

    /// Cancel every open order.
    fn cancel_all(&self) -> Result<(), GatewayError>;
}

/// Map the HTTP status of a cancel call.
///
/// 404 means the id is unknown, 422 means the order already reached a
/// state that cannot be canceled.
pub fn map_cancel_status(order_id: &str, status: u16, body: &str) -> Result<(), GatewayError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(GatewayError::NotFound {
            order_id: order_id.to_string(),
        }),
        422 => Err(GatewayError::NotCancelable {
            order_id: order_id.to_string(),
        }),
        _ => Err(GatewayError::Rejected {
            status,
            body: body.to_string(),
        }),
    }
}
