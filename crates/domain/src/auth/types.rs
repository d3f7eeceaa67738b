//! Credential and session state types

use serde::{Deserialize, Serialize};

/// Lifecycle of a logical session.
///
/// `Authenticated → Refreshing → Unauthenticated | Authenticated`.
/// Repeated 401s while `Refreshing` queue up instead of starting another
/// invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// A token is stored and attached to outbound requests.
    Authenticated,
    /// A 401 is being handled; new 401s wait for it.
    Refreshing,
    /// No token is stored.
    Unauthenticated,
}

impl SessionState {
    /// Returns true if requests will carry credentials.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Formats a token as an `Authorization` header value.
#[must_use]
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl LoginRequest {
    /// Creates a login request.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the credentials as form fields.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ]
    }
}

/// Token issued by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The bearer token
    pub access_token: String,
    /// Token type, `bearer` in practice
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Profile of the authenticated user, if returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
