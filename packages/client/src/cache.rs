//! Revalidating per-resource cache.
//!
//! A [`ResourceCache`] remembers the last value fetched for one [`Resource`],
//! keyed by the access token it was fetched with. Changing the token starts a
//! new key: the old value is dropped and any fetch still running for the old
//! key is discarded when it completes instead of overwriting newer state.
//!
//! Revalidations are serialized: while one is in flight for a key, a second
//! caller waits for it and reuses its result rather than issuing another
//! request.

use std::sync::Arc;
use std::time::Duration;

use sensordash_api::SchemaError;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::fetcher::{Resource, ResourceFetcher};
use crate::hooks::Logout;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
struct Entry<T> {
    key: Option<String>,
    data: Option<T>,
    /// Bumped on every publish, key changes included.
    generation: u64,
}

pub struct ResourceCache<R: Resource> {
    fetcher: Arc<ResourceFetcher>,
    entry: watch::Sender<Entry<R::Output>>,
    in_flight: Mutex<()>,
}

impl<R: Resource> ResourceCache<R> {
    pub fn new(fetcher: Arc<ResourceFetcher>) -> Self {
        let (entry, _) = watch::channel(Entry {
            key: None,
            data: None,
            generation: 0,
        });
        Self {
            fetcher,
            entry,
            in_flight: Mutex::new(()),
        }
    }

    /// Last value fetched for the current key.
    pub fn data(&self) -> Option<R::Output> {
        self.entry.borrow().data.clone()
    }

    /// Fetch `R` for `access_token`, publish the result and return it.
    ///
    /// Follows the [`ResourceFetcher::fetch`] contract: `Ok(None)` for no
    /// data, `Err` only for schema failures, which leave the cached value
    /// untouched.
    pub async fn revalidate(
        &self,
        access_token: Option<&str>,
        logout: &dyn Logout,
    ) -> Result<Option<R::Output>, SchemaError> {
        let key = access_token.map(str::to_string);
        let started = self.switch_key(&key);

        let _guard = self.in_flight.lock().await;
        {
            let entry = self.entry.borrow();
            if entry.key == key && entry.generation != started {
                debug!(resource = R::PATH, "reusing concurrent revalidation");
                return Ok(entry.data.clone());
            }
        }

        let data = self.fetcher.fetch::<R>(access_token, logout).await?;

        let published = self.entry.send_if_modified(|entry| {
            if entry.key != key {
                return false;
            }
            entry.data = data.clone();
            entry.generation += 1;
            true
        });
        if !published {
            debug!(resource = R::PATH, "discarding result for a stale access token");
        }
        Ok(data)
    }

    /// Make `key` current, dropping data cached for any other key.
    /// Returns the generation observed after the switch.
    fn switch_key(&self, key: &Option<String>) -> u64 {
        self.entry.send_if_modified(|entry| {
            if entry.key == *key {
                return false;
            }
            entry.key = key.clone();
            entry.data = None;
            entry.generation += 1;
            true
        });
        self.entry.borrow().generation
    }

    /// Spawn a loop revalidating with the store's current token every
    /// `interval`. The loop ends with the first schema failure.
    pub fn spawn_revalidation(
        self: &Arc<Self>,
        session: Arc<SessionStore>,
        interval: Duration,
    ) -> JoinHandle<Result<(), SchemaError>> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let token = session.access_token();
                if let Err(e) = cache.revalidate(token.as_deref(), session.as_ref()).await {
                    error!(resource = R::PATH, "revalidation stopped: {e}");
                    return Err(e);
                }
            }
        })
    }
}
