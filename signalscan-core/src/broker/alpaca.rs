//! Alpaca trading API adapter.

use super::gateway::{map_cancel_status, GatewayError, OrderGateway};
use super::order::{OrderAck, OrderRequest};
use crate::config::{secret_from_env, ConfigError};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

pub const KEY_ID_VAR: &str = "APCA_API_KEY_ID";
pub const SECRET_KEY_VAR: &str = "APCA_API_SECRET_KEY";

/// API key pair for the `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY` headers.
pub struct AlpacaCredentials {
    pub key_id: SecretString,
    pub secret_key: SecretString,
}

impl AlpacaCredentials {
    /// Read both keys from `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: secret_from_env(KEY_ID_VAR)?,
            secret_key: secret_from_env(SECRET_KEY_VAR)?,
        })
    }
}

pub struct AlpacaGateway {
    client: Client,
    orders_url: String,
}

impl AlpacaGateway {
    pub fn new(endpoint: &str, credentials: &AlpacaCredentials) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", sensitive_header(&credentials.key_id)?);
        headers.insert("APCA-API-SECRET-KEY", sensitive_header(&credentials.secret_key)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            orders_url: orders_url(endpoint),
        })
    }

    pub fn orders_url(&self) -> &str {
        &self.orders_url
    }
}

impl OrderGateway for AlpacaGateway {
    fn submit(&self, order: &OrderRequest) -> Result<OrderAck, GatewayError> {
        let body = order.to_json()?;
        let resp = self
            .client
            .post(&self.orders_url)
            .json(&body)
            .send()
            .map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(rejected(resp));
        }
        let ack: OrderAck = resp.json().map_err(network)?;
        tracing::info!(symbol = %order.symbol, order_id = %ack.id, status = %ack.status, "order submitted");
        Ok(ack)
    }

    fn cancel(&self, order_id: &str) -> Result<(), GatewayError> {
        let resp = self
            .client
            .delete(format!("{}/{order_id}", self.orders_url))
            .send()
            .map_err(network)?;
        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_default();
        map_cancel_status(order_id, status, &body)?;
        tracing::info!(order_id, "order canceled");
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), GatewayError> {
        let resp = self.client.delete(&self.orders_url).send().map_err(network)?;
        if !resp.status().is_success() {
            return Err(rejected(resp));
        }
        tracing::info!("all open orders canceled");
        Ok(())
    }
}

/// `{endpoint}/v2/orders`, tolerating a trailing slash on the endpoint.
fn orders_url(endpoint: &str) -> String {
    format!("{}/v2/orders", endpoint.trim_end_matches('/'))
}

fn sensitive_header(secret: &SecretString) -> Result<HeaderValue, GatewayError> {
    let mut value = HeaderValue::from_str(secret.expose_secret())
        .map_err(|_| GatewayError::InvalidCredentials("key contains invalid header characters".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

fn network(e: reqwest::Error) -> GatewayError {
    GatewayError::Network(e.to_string())
}

fn rejected(resp: Response) -> GatewayError {
    let status = resp.status().as_u16();
    let body = resp.text().unwrap_or_default();
    tracing::warn!(status, "broker rejected request");
    GatewayError::Rejected { status, body }
}
