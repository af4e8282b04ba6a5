//! Per-endpoint schema validation.
//!
//! Each function takes the whole decoded response body and either returns the
//! internally-named value or a [`SchemaError`]. A response is accepted or
//! rejected as a unit: a single bad record rejects the entire collection.
//! Unknown extra fields are ignored.

use sensordash::{Network, Session};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::endpoints::{AUTHENTICATION_PATH, NETWORKS_PATH};
use crate::{AuthenticationResponse, NetworkRecord};

/// A response body did not match the schema of its endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("response from {endpoint} does not match its schema: {reason}")]
pub struct SchemaError {
    /// Path of the endpoint whose response failed, e.g. `/networks`.
    pub endpoint: &'static str,
    pub reason: String,
}

impl SchemaError {
    pub fn new(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            reason: reason.into(),
        }
    }
}

/// Validate a `POST /authentication` response body.
pub fn parse_session(body: Value) -> Result<Session, SchemaError> {
    decode::<AuthenticationResponse>(AUTHENTICATION_PATH, body).map(Session::from)
}

/// Validate a `GET /networks` response body.
///
/// Order of the returned networks matches the order of the response array.
pub fn parse_networks(body: Value) -> Result<Vec<Network>, SchemaError> {
    let records = decode::<Vec<NetworkRecord>>(NETWORKS_PATH, body)?;
    Ok(records.into_iter().map(Network::from).collect())
}

/// Decode raw response bytes as JSON, attributing failures to `endpoint`.
pub fn parse_json(endpoint: &'static str, bytes: &[u8]) -> Result<Value, SchemaError> {
    serde_json::from_slice(bytes).map_err(|e| SchemaError::new(endpoint, e.to_string()))
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: Value) -> Result<T, SchemaError> {
    serde_json::from_value(body).map_err(|e| SchemaError::new(endpoint, e.to_string()))
}
