//! API use cases built on the authenticated session.

mod auth;
mod contact;
mod content;

pub use auth::AuthService;
pub use contact::ContactService;
pub use content::ContentService;

use portal_domain::ApiResponse;
use serde::de::DeserializeOwned;

use crate::error::{SessionError, SessionResult};

/// Decodes a successful response body. An empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(response: &ApiResponse) -> SessionResult<T> {
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| SessionError::InvalidResponse(e.to_string()))
}
