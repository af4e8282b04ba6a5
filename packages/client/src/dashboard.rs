//! Wires the session store, fetcher and caches together.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sensordash::Network;
use sensordash_api::{ApiEndpoints, SchemaError};
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::ResourceCache;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::fetcher::{Networks, ResourceFetcher};
use crate::hooks::{Notifier, Reload, TracingNotifier};
use crate::session::SessionStore;
use crate::storage::{memory::MemoryStorage, sqlite::SqliteStorage, SessionStorage, StorageError};

/// Everything a front-end needs to show the networks of the logged-in user.
pub struct Dashboard {
    pub session: Arc<SessionStore>,
    pub fetcher: Arc<ResourceFetcher>,
    pub networks: Arc<ResourceCache<Networks>>,
    refresh_interval: Duration,
}

/// Handles of the loops started by [`Dashboard::spawn_background`].
pub struct BackgroundTasks {
    pub session_refresh: JoinHandle<()>,
    /// Ends with the first schema failure of a networks response.
    pub networks_revalidation: JoinHandle<Result<(), SchemaError>>,
}

impl BackgroundTasks {
    pub fn abort(&self) {
        self.session_refresh.abort();
        self.networks_revalidation.abort();
    }
}

impl Dashboard {
    /// Build a dashboard on explicit storage and notifier.
    ///
    /// The session store doubles as the fetcher's reload hook: a reload
    /// re-runs the session lookup from storage.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        let endpoints = ApiEndpoints::new(&config.server_url);

        let session = Arc::new(SessionStore::new(storage, client.clone(), endpoints.clone()));
        let fetcher = Arc::new(ResourceFetcher::new(
            client,
            endpoints,
            notifier,
            Arc::clone(&session) as Arc<dyn Reload>,
        ));
        let networks = Arc::new(ResourceCache::new(Arc::clone(&fetcher)));

        Ok(Self {
            session,
            fetcher,
            networks,
            refresh_interval: config.refresh_interval,
        })
    }

    /// Build a dashboard from config alone: SQLite storage when
    /// `session_db` is set, memory otherwise, and notices sent to `tracing`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let storage: Arc<dyn SessionStorage> = match &config.session_db {
            Some(path) => {
                info!("session storage: SQLite at {path}");
                Arc::new(
                    SqliteStorage::open(path)
                        .map_err(|e| StorageError::Internal(format!("open {path}: {e}")))?,
                )
            }
            None => {
                info!("session storage: in-memory (session will not survive exit)");
                Arc::new(MemoryStorage::new())
            }
        };
        Self::new(config, storage, Arc::new(TracingNotifier))
    }

    /// Start the session refresh and networks revalidation loops, both
    /// ticking at the configured refresh interval.
    pub fn spawn_background(&self) -> BackgroundTasks {
        BackgroundTasks {
            session_refresh: self.session.spawn_refresh(self.refresh_interval),
            networks_revalidation: self
                .networks
                .spawn_revalidation(Arc::clone(&self.session), self.refresh_interval),
        }
    }

    /// Networks of the current session, revalidated now.
    ///
    /// `Ok(None)` when logged out or when the fetch failed and the session
    /// was torn down.
    pub async fn networks(&self) -> Result<Option<Vec<Network>>, SchemaError> {
        let token = self.session.access_token();
        self.networks
            .revalidate(token.as_deref(), self.session.as_ref())
            .await
    }
}
