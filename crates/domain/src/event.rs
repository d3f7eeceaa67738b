//! Error events broadcast by the session.
//!
//! Every failure the session observes is both returned to the caller and
//! published as an [`ErrorEvent`] so that cross-cutting consumers (toasts,
//! logging) can react without each caller wiring them up.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a broadcast failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was received.
    NetworkError,
    /// The server answered with a non-2xx status.
    ApiError,
    /// A 401 forced the session to be invalidated.
    AuthExpired,
    /// The invalidation sequence itself failed.
    RefreshError,
}

impl ErrorKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::ApiError => "api_error",
            Self::AuthExpired => "auth_expired",
            Self::RefreshError => "refresh_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure notification delivered to error listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// What went wrong.
    pub kind: ErrorKind,
    /// HTTP status, when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
}

impl ErrorEvent {
    /// A request failed without any response.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NetworkError,
            status: None,
            message: message.into(),
        }
    }

    /// The server rejected a request.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ApiError,
            status: Some(status),
            message: message.into(),
        }
    }

    /// The session was invalidated, normally because of a 401.
    #[must_use]
    pub fn auth_expired(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::AuthExpired,
            status,
            message: message.into(),
        }
    }

    /// Invalidating the session failed.
    #[must_use]
    pub fn refresh(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RefreshError,
            status: None,
            message: message.into(),
        }
    }
}
