//! Classification of failed resource fetches.
//!
//! A fetch that does not end in a 2xx response falls into exactly one
//! [`FailureClass`]. Every class currently tears the session down; the
//! distinction only changes the [`Notice`] the user sees.
//!
//! | Status | Class | Notice |
//! |--------|-------|--------|
//! | `401` | [`FailureClass::SessionExpired`] | 🔑 Session expired |
//! | `500`–`599` | [`FailureClass::ServerError`] | 🔥 Server error |
//! | anything else, or no response | [`FailureClass::ClientError`] | ❓ Client error |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// The server rejected the bearer token.
    SessionExpired,
    /// The server failed with a 5xx status.
    ServerError,
    /// Any other non-2xx status, or a transport failure with no status at all.
    ClientError,
}

impl FailureClass {
    /// Classify a failed fetch by its HTTP status, if one was received.
    pub fn classify(status: Option<u16>) -> Self {
        match status {
            Some(401) => FailureClass::SessionExpired,
            Some(500..=599) => FailureClass::ServerError,
            _ => FailureClass::ClientError,
        }
    }

    /// Whether this failure invalidates the session.
    ///
    /// True for every class: server errors and generic client errors tear the
    /// session down exactly like an expired token. This keeps the dashboard's
    /// established reset-to-known-state policy rather than retrying.
    pub fn requires_reauthentication(self) -> bool {
        true
    }

    pub fn notice(self) -> Notice {
        Notice::for_class(self)
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::SessionExpired => write!(f, "session_expired"),
            FailureClass::ServerError => write!(f, "server_error"),
            FailureClass::ClientError => write!(f, "client_error"),
        }
    }
}

/// A short-lived, user-facing notice keyed by failure class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub class: FailureClass,
    pub message: &'static str,
    pub icon: &'static str,
}

impl Notice {
    pub fn for_class(class: FailureClass) -> Self {
        let (message, icon) = match class {
            FailureClass::SessionExpired => ("Session expired", "🔑"),
            FailureClass::ServerError => ("Server error", "🔥"),
            FailureClass::ClientError => ("Client error", "❓"),
        };
        Self {
            class,
            message,
            icon,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon, self.message)
    }
}
