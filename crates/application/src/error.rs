//! Session error types

use portal_domain::{ApiResponse, DomainError};
use thiserror::Error;

use crate::ports::{NavigationError, StorageError, TransportError};

/// Errors returned to callers of the session.
///
/// Failures the session observes are returned here unchanged in meaning and
/// are additionally broadcast on the error bus.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
        /// The response as received.
        response: Box<ApiResponse>,
    },

    /// A queued request gave up waiting for the session to be re-established.
    #[error("gave up after waiting {waited_ms} ms for the session invalidation to finish")]
    RetryTimedOut {
        /// How long the request waited.
        waited_ms: u64,
    },

    /// Reading or writing the token failed.
    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),

    /// The login redirect could not be performed.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// A successful response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl SessionError {
    /// Builds an API error from a failed response.
    #[must_use]
    pub fn api(response: ApiResponse, message: String) -> Self {
        Self::Api {
            status: response.status,
            message,
            response: Box::new(response),
        }
    }

    /// Returns the HTTP status if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the failed response, if any.
    #[must_use]
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Api { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns true for errors that carried no response at all.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn api_error_exposes_status_and_response() {
        let error = SessionError::api(ApiResponse::new(404, "{}"), "Not found".to_string());
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.response().map(|r| r.status), Some(404));
        assert_eq!(error.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn network_error_has_no_status() {
        let error = SessionError::from(TransportError::ConnectionFailed("reset".to_string()));
        assert!(error.is_network());
        assert_eq!(error.status(), None);
    }
}
