//! Authentication types — `POST /authentication`.

use sensordash::Session;
use serde::{Deserialize, Serialize};

/// Credentials sent to `POST /authentication`.
///
/// ```json
/// { "user_name": "ada", "password": "hunter2" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticationRequest {
    pub user_name: String,
    pub password: String,
}

impl AuthenticationRequest {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

/// Successful response body of `POST /authentication`.
///
/// ```json
/// { "user_identifier": "u-42", "access_token": "abc123" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticationResponse {
    pub user_identifier: String,
    pub access_token: String,
}

impl From<AuthenticationResponse> for Session {
    fn from(r: AuthenticationResponse) -> Self {
        Session::new(r.user_identifier, r.access_token)
    }
}
