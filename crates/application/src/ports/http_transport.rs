//! HTTP transport port

use async_trait::async_trait;
use portal_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Failures where no HTTP response was received.
///
/// A response with a non-2xx status is not a transport error; it is
/// returned as an [`ApiResponse`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending HTTP requests.
///
/// Implementations send the request exactly as given; credential handling
/// belongs to the session that wraps them.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns whatever response the server produced.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] only when no response was received.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}
