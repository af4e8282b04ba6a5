//! Internal data types shared across the dashboard.
//!
//! These are the shapes handed to callers *after* validation. Field names
//! follow the internal naming convention (`userIdentifier`, `identifier`);
//! the snake_case wire names of the remote API never leak past
//! `sensordash-api`.

use serde::{Deserialize, Serialize};

/// The authenticated identity cached on the client.
///
/// A session either exists in full or not at all: both fields are always
/// present together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque identifier of the logged-in user.
    pub user_identifier: String,

    /// Bearer token sent in the `Authorization` header.
    pub access_token: String,
}

impl Session {
    pub fn new(user_identifier: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_identifier: user_identifier.into(),
            access_token: access_token.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// A sensor network, as shown on a dashboard card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    pub identifier: String,
    pub name: String,
}

impl Network {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
        }
    }
}

/// Result of the most recent session lookup against durable storage.
///
/// The session store publishes one of these on every change; the
/// [`AuthenticationState`] is always derived from it and never stored
/// separately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionLookup {
    /// No lookup has completed yet.
    #[default]
    Pending,
    /// A complete session was found.
    Found(Session),
    /// The lookup failed or storage held no (complete) session.
    Missing,
}

impl SessionLookup {
    /// Build a completed lookup from an optional session.
    pub fn from_option(session: Option<Session>) -> Self {
        match session {
            Some(s) => SessionLookup::Found(s),
            None => SessionLookup::Missing,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionLookup::Found(s) => Some(s),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session().map(|s| s.access_token.as_str())
    }

    pub fn authentication_state(&self) -> AuthenticationState {
        match self {
            SessionLookup::Found(_) => AuthenticationState::LoggedIn,
            SessionLookup::Missing => AuthenticationState::LoggedOut,
            SessionLookup::Pending => AuthenticationState::Loading,
        }
    }
}

/// Three-valued authentication state shown by the UI.
///
/// Serialises as `"loading"`, `"loggedIn"` or `"loggedOut"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticationState {
    Loading,
    LoggedIn,
    LoggedOut,
}

impl std::fmt::Display for AuthenticationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationState::Loading => write!(f, "loading"),
            AuthenticationState::LoggedIn => write!(f, "loggedIn"),
            AuthenticationState::LoggedOut => write!(f, "loggedOut"),
        }
    }
}
