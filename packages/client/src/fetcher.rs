//! Authenticated resource fetching with session recovery.
//!
//! [`ResourceFetcher::fetch`] is the one place with a failure policy:
//!
//! 1. No access token: return `Ok(None)` without touching the network.
//! 2. `GET` the resource with `Authorization: Bearer <token>`.
//! 3. 2xx: validate the whole body against the resource schema and return
//!    the internally-named value. A schema failure is returned as `Err` and
//!    is the only error that escapes.
//! 4. Anything else: classify it ([`FailureClass`]), show the notice, log
//!    the user out, reload, and return `Ok(None)`.
//!
//! `Ok(None)` is therefore ambiguous between "logged out" and "the last fetch
//! failed". Callers that need to tell them apart read the session store.

use std::sync::Arc;

use reqwest::Client;
use sensordash::{FailureClass, Network};
use sensordash_api::{parse_json, parse_networks, ApiEndpoints, SchemaError, NETWORKS_PATH};
use serde_json::Value;
use tracing::{debug, error};

use crate::hooks::{Logout, Notifier, Reload};

/// A remote resource that can be fetched with a bearer token.
pub trait Resource: Send + Sync + 'static {
    /// Validated, internally-named form of the response.
    type Output: Clone + Send + Sync + 'static;

    /// Endpoint path, used for logging and schema errors.
    const PATH: &'static str;

    fn url(endpoints: &ApiEndpoints) -> String;

    fn parse(body: Value) -> Result<Self::Output, SchemaError>;
}

/// `GET /networks`
pub struct Networks;

impl Resource for Networks {
    type Output = Vec<Network>;

    const PATH: &'static str = NETWORKS_PATH;

    fn url(endpoints: &ApiEndpoints) -> String {
        endpoints.networks_url()
    }

    fn parse(body: Value) -> Result<Self::Output, SchemaError> {
        parse_networks(body)
    }
}

/// Fetches [`Resource`]s and applies the failure policy.
pub struct ResourceFetcher {
    client: Client,
    endpoints: ApiEndpoints,
    notifier: Arc<dyn Notifier>,
    reload: Arc<dyn Reload>,
}

impl ResourceFetcher {
    pub fn new(
        client: Client,
        endpoints: ApiEndpoints,
        notifier: Arc<dyn Notifier>,
        reload: Arc<dyn Reload>,
    ) -> Self {
        Self {
            client,
            endpoints,
            notifier,
            reload,
        }
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Fetch `R` with `access_token`, calling `logout` if the request fails.
    pub async fn fetch<R: Resource>(
        &self,
        access_token: Option<&str>,
        logout: &dyn Logout,
    ) -> Result<Option<R::Output>, SchemaError> {
        let Some(token) = access_token else {
            debug!(resource = R::PATH, "no access token; skipping fetch");
            return Ok(None);
        };

        let response = match self
            .client
            .get(R::url(&self.endpoints))
            .bearer_auth(token)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(resource = R::PATH, "error while fetching {}: {e}", R::PATH);
                self.recover(e.status().map(|s| s.as_u16()), logout).await;
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!(
                resource = R::PATH,
                status = status.as_u16(),
                "error while fetching {}",
                R::PATH
            );
            self.recover(Some(status.as_u16()), logout).await;
            return Ok(None);
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                error!(resource = R::PATH, "error while reading {}: {e}", R::PATH);
                self.recover(None, logout).await;
                return Ok(None);
            }
        };

        let body = parse_json(R::PATH, &bytes)?;
        R::parse(body).map(Some)
    }

    /// Notice, then logout, then reload. The reload always runs last.
    async fn recover(&self, status: Option<u16>, logout: &dyn Logout) {
        let class = FailureClass::classify(status);
        self.notifier.notify(&class.notice());
        if class.requires_reauthentication() {
            logout.logout().await;
        }
        self.reload.reload().await;
    }
}
