//! SQLite-backed session storage.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.
//!
//! # Schema
//!
//! - `session_entries` — one row per persisted key (`userIdentifier`,
//!   `accessToken`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use sensordash::Session;

use super::{
    session_from_entries, SessionStorage, StorageError, ACCESS_TOKEN_KEY, USER_IDENTIFIER_KEY,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS session_entries (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// SQLite-backed implementation of [`SessionStorage`].
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StorageError::Internal("connection lock poisoned".into()))?;
            f(&mut conn).map_err(map_err)
        })
        .await
        .map_err(|e| StorageError::Internal(format!("task join error: {e}")))?
    }
}

fn map_err(e: rusqlite::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM session_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
        .await
    }

    async fn set_session(&self, session: &Session) -> Result<(), StorageError> {
        let session = session.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            for (key, value) in [
                (USER_IDENTIFIER_KEY, &session.user_identifier),
                (ACCESS_TOKEN_KEY, &session.access_token),
            ] {
                tx.execute(
                    "INSERT INTO session_entries (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                )?;
            }
            tx.commit()
        })
        .await
    }

    async fn remove_session(&self) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM session_entries WHERE key IN (?1, ?2)",
                params![USER_IDENTIFIER_KEY, ACCESS_TOKEN_KEY],
            )
            .map(|_| ())
        })
        .await
    }

    async fn load_session(&self) -> Result<Option<Session>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT key, value FROM session_entries WHERE key IN (?1, ?2)")?;
            let rows = stmt.query_map(params![USER_IDENTIFIER_KEY, ACCESS_TOKEN_KEY], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let (mut user_identifier, mut access_token) = (None, None);
            for row in rows {
                let (key, value) = row?;
                if key == USER_IDENTIFIER_KEY {
                    user_identifier = Some(value);
                } else {
                    access_token = Some(value);
                }
            }
            Ok(session_from_entries(user_identifier, access_token))
        })
        .await
    }
}
