//! In-memory session storage.
//!
//! Entries live in a [`HashMap`] behind a [`RwLock`] and are lost when the
//! process exits.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sensordash::Session;

use super::{
    session_from_entries, SessionStorage, StorageError, ACCESS_TOKEN_KEY, USER_IDENTIFIER_KEY,
};

/// Thread-safe, in-memory implementation of [`SessionStorage`].
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `session`, as if a previous run had logged in.
    pub fn with_session(session: &Session) -> Self {
        let mut entries = HashMap::new();
        entries.insert(USER_IDENTIFIER_KEY.to_string(), session.user_identifier.clone());
        entries.insert(ACCESS_TOKEN_KEY.to_string(), session.access_token.clone());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Internal("memory storage lock poisoned".into())
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(USER_IDENTIFIER_KEY.to_string(), session.user_identifier.clone());
        entries.insert(ACCESS_TOKEN_KEY.to_string(), session.access_token.clone());
        Ok(())
    }

    async fn remove_session(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(USER_IDENTIFIER_KEY);
        entries.remove(ACCESS_TOKEN_KEY);
        Ok(())
    }

    async fn load_session(&self) -> Result<Option<Session>, StorageError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(session_from_entries(
            entries.get(USER_IDENTIFIER_KEY).cloned(),
            entries.get(ACCESS_TOKEN_KEY).cloned(),
        ))
    }
}
