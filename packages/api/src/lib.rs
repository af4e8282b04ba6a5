//! Request and response types for the remote dashboard API.
//!
//! This crate encodes the HTTP contract of the remote API as Rust types and
//! owns the validation boundary: raw JSON goes in, internally-named
//! [`sensordash`] types come out, or the whole response is rejected with a
//! [`SchemaError`].
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | POST | `/authentication` | [`AuthenticationRequest`] → [`AuthenticationResponse`] |
//! | GET | `/networks` | → `Vec<`[`NetworkRecord`]`>` (bearer auth) |

pub mod auth;
pub mod endpoints;
pub mod network;
pub mod schema;

pub use auth::{AuthenticationRequest, AuthenticationResponse};
pub use endpoints::{ApiEndpoints, AUTHENTICATION_PATH, NETWORKS_PATH};
pub use network::NetworkRecord;
pub use schema::{parse_json, parse_networks, parse_session, SchemaError};
