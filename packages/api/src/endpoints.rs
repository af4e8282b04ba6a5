//! URL helpers for the remote API.

/// Path of the credential exchange endpoint.
pub const AUTHENTICATION_PATH: &str = "/authentication";

/// Path of the network listing endpoint.
pub const NETWORKS_PATH: &str = "/networks";

/// Endpoint URLs derived from the configured server URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Server URL without a trailing slash, e.g. `http://127.0.0.1:8000`.
    pub base: String,
}

impl ApiEndpoints {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/authentication`
    pub fn authentication_url(&self) -> String {
        format!("{}{}", self.base, AUTHENTICATION_PATH)
    }

    /// `{base}/networks`
    pub fn networks_url(&self) -> String {
        format!("{}{}", self.base, NETWORKS_PATH)
    }
}
