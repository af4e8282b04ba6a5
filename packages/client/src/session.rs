//! The session store: single source of truth for who is logged in.
//!
//! [`SessionStore`] owns the durable [`SessionStorage`] and a
//! [`tokio::sync::watch`] channel carrying the latest [`SessionLookup`].
//! Only the store writes to either; any number of readers subscribe and
//! always observe the most recently published value.
//!
//! The [`AuthenticationState`] is never stored. It is derived from the
//! published lookup on every read, so it can only be `loading` before the
//! first lookup completes, and `loggedIn`/`loggedOut` afterwards.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sensordash::{AuthenticationState, Session, SessionLookup};
use sensordash_api::{
    parse_json, parse_session, ApiEndpoints, AuthenticationRequest, AUTHENTICATION_PATH,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::hooks::{Logout, Reload};
use crate::storage::SessionStorage;

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    client: Client,
    endpoints: ApiEndpoints,
    lookup: watch::Sender<SessionLookup>,
}

impl SessionStore {
    /// Create a store. The published lookup starts as
    /// [`SessionLookup::Pending`] until [`refresh`](Self::refresh) or a
    /// login/logout completes.
    pub fn new(storage: Arc<dyn SessionStorage>, client: Client, endpoints: ApiEndpoints) -> Self {
        let (lookup, _) = watch::channel(SessionLookup::Pending);
        Self {
            storage,
            client,
            endpoints,
            lookup,
        }
    }

    /// Read the session from durable storage.
    ///
    /// Never fails: a storage error is logged and reported as no session.
    pub async fn get_session(&self) -> Option<Session> {
        match self.storage.load_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("session lookup failed: {e}");
                None
            }
        }
    }

    /// The most recently published lookup.
    pub fn current(&self) -> SessionLookup {
        self.lookup.borrow().clone()
    }

    /// Access token of the published session, if logged in.
    pub fn access_token(&self) -> Option<String> {
        self.lookup.borrow().access_token().map(str::to_string)
    }

    pub fn authentication_state(&self) -> AuthenticationState {
        self.lookup.borrow().authentication_state()
    }

    /// Exchange credentials for a session, persist it and publish it.
    ///
    /// Nothing is persisted unless the server answers 2xx with a body that
    /// matches the session schema.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let response = self
            .client
            .post(self.endpoints.authentication_url())
            .json(&AuthenticationRequest::new(username, password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "authentication rejected");
            return Err(ClientError::BadStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let session = parse_session(parse_json(AUTHENTICATION_PATH, &bytes)?)?;

        self.storage.set_session(&session).await?;
        self.publish(SessionLookup::Found(session.clone()));
        info!(user = %session.user_identifier, "logged in");
        Ok(session)
    }

    /// Clear the persisted session and publish that it is gone.
    ///
    /// Safe to call when already logged out. Subscribers are told the session
    /// is gone even if clearing storage fails; the error is still returned.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let cleared = self.storage.remove_session().await;
        self.publish(SessionLookup::Missing);
        cleared?;
        info!("logged out");
        Ok(())
    }

    /// Re-run the session lookup from durable storage and publish the result.
    pub async fn refresh(&self) -> AuthenticationState {
        let lookup = SessionLookup::from_option(self.get_session().await);
        let state = lookup.authentication_state();
        self.publish(lookup);
        state
    }

    /// Receiver that observes every published lookup.
    pub fn subscribe(&self) -> watch::Receiver<SessionLookup> {
        self.lookup.subscribe()
    }

    /// Stream of published lookups, starting with the current one.
    pub fn changes(&self) -> WatchStream<SessionLookup> {
        WatchStream::new(self.subscribe())
    }

    /// Spawn the background loop that re-validates the published session
    /// every `interval`. The first lookup runs immediately.
    pub fn spawn_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let state = store.refresh().await;
                debug!(%state, "session refreshed");
            }
        })
    }

    /// Publish `lookup`, notifying subscribers only when it changed.
    fn publish(&self, lookup: SessionLookup) {
        self.lookup.send_if_modified(|current| {
            if *current == lookup {
                false
            } else {
                *current = lookup;
                true
            }
        });
    }
}

#[async_trait]
impl Logout for SessionStore {
    async fn logout(&self) {
        if let Err(e) = SessionStore::logout(self).await {
            warn!("logout could not clear the stored session: {e}");
        }
    }
}

#[async_trait]
impl Reload for SessionStore {
    async fn reload(&self) {
        let state = self.refresh().await;
        info!(%state, "reloaded session from storage");
    }
}
