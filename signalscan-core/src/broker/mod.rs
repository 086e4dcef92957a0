//! Order placement: request encoding, the gateway seam and the Alpaca adapter.

pub mod alpaca;
pub mod gateway;
pub mod order;

pub use alpaca::{AlpacaCredentials, AlpacaGateway};
pub use gateway::{map_cancel_status, GatewayError, OrderGateway};
pub use order::{encode_decimal, OrderAck, OrderRequest};
