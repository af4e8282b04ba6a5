//! Error type for client operations that report failure to the caller.
//!
//! Resource fetches do not use this type: their HTTP failures are recovered
//! locally (see [`crate::fetcher`]) and only schema failures escape, as
//! [`SchemaError`].

use sensordash_api::SchemaError;

use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request failed before a status was received, or the client
    /// could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned status {0}")]
    BadStatus(u16),

    /// The response body did not match the endpoint's schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Reading or writing the persisted session failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
