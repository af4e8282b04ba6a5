//! Durable client-side session storage.
//!
//! A session is persisted as two key/value entries, [`USER_IDENTIFIER_KEY`]
//! and [`ACCESS_TOKEN_KEY`]. They are written together on login and removed
//! together on logout; a store holding only one of them has no session.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStorage`] | Tests, one-shot processes |
//! | [`SqliteStorage`] | Sessions that must survive a restart |
//!
//! [`MemoryStorage`]: memory::MemoryStorage
//! [`SqliteStorage`]: sqlite::SqliteStorage

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use sensordash::Session;

/// Key of the persisted user identifier entry.
pub const USER_IDENTIFIER_KEY: &str = "userIdentifier";

/// Key of the persisted access token entry.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Errors that storage operations can return.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

/// The persistence contract for session entries.
#[async_trait]
pub trait SessionStorage: Send + Sync + 'static {
    /// Read a single entry.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write both session entries, replacing any previous values.
    async fn set_session(&self, session: &Session) -> Result<(), StorageError>;

    /// Remove both session entries. Removing an absent session succeeds.
    async fn remove_session(&self) -> Result<(), StorageError>;

    /// Read the stored session. Returns `None` unless both entries exist.
    ///
    /// Both entries are read in one backend operation, so a concurrent
    /// [`set_session`](Self::set_session) is observed entirely or not at all.
    async fn load_session(&self) -> Result<Option<Session>, StorageError>;
}

/// Pair two entries into a session; half a session is no session.
pub(crate) fn session_from_entries(
    user_identifier: Option<String>,
    access_token: Option<String>,
) -> Option<Session> {
    match (user_identifier, access_token) {
        (Some(u), Some(t)) => Some(Session::new(u, t)),
        _ => None,
    }
}
