//! Client configuration, populated from environment variables.

use std::time::Duration;

/// Runtime configuration for the dashboard client.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `SENSORDASH_SERVER_URL` | `http://127.0.0.1:8000` | Base URL of the remote API |
/// | `SENSORDASH_SESSION_DB` | (absent = in-memory) | Path to the SQLite session database |
/// | `SENSORDASH_REFRESH_INTERVAL_MS` | `250` | Milliseconds between background session lookups |
/// | `SENSORDASH_HTTP_TIMEOUT_SECS` | `30` | Transport timeout for every request |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote API, e.g. `"http://127.0.0.1:8000"`.
    pub server_url: String,

    /// Path to the SQLite database holding the session entries.
    /// `None` keeps the session in memory (lost on exit).
    pub session_db: Option<String>,

    /// Interval of the background session re-validation.
    pub refresh_interval: Duration,

    pub http_timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_SERVER_URL: &'static str = "http://127.0.0.1:8000";

    /// Config pointing at `server_url` with every other field defaulted.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            session_db: None,
            refresh_interval: Duration::from_millis(250),
            http_timeout: Duration::from_secs(30),
        }
    }

    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from `lookup`, which maps a variable name to its value.
    /// Unparseable numbers fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new(
            lookup("SENSORDASH_SERVER_URL").unwrap_or_else(|| Self::DEFAULT_SERVER_URL.into()),
        );

        let refresh_interval = lookup("SENSORDASH_REFRESH_INTERVAL_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.refresh_interval);

        let http_timeout = lookup("SENSORDASH_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            session_db: lookup("SENSORDASH_SESSION_DB"),
            refresh_interval,
            http_timeout,
            ..defaults
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SERVER_URL)
    }
}
