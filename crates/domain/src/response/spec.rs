//! Received response type

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::request::Headers;

/// Status returned when credentials are missing or rejected.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// A response received from the API, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body as text
    pub body: String,
}

impl ApiResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for `401 Unauthorized`.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == STATUS_UNAUTHORIZED
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Returns the human-readable failure message for this response.
    ///
    /// Prefers the server's `detail` field, then `message`, and falls back
    /// to `Error: <status>` when neither is a string.
    #[must_use]
    pub fn error_message(&self) -> String {
        let payload = serde_json::from_str::<serde_json::Value>(&self.body).ok();
        let field = |name: &str| {
            payload
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        field("detail")
            .or_else(|| field("message"))
            .unwrap_or_else(|| format!("Error: {}", self.status))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_checks() {
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(302, "").is_success());
        assert!(ApiResponse::new(401, "").is_unauthorized());
        assert!(!ApiResponse::new(403, "").is_unauthorized());
    }

    #[test]
    fn error_message_prefers_detail() {
        let response = ApiResponse::new(
            404,
            r#"{"detail": "Article not found", "message": "ignored"}"#,
        );
        assert_eq!(response.error_message(), "Article not found");
    }

    #[test]
    fn error_message_falls_back_to_message_field() {
        let response = ApiResponse::new(400, r#"{"message": "Username already taken"}"#);
        assert_eq!(response.error_message(), "Username already taken");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            ApiResponse::new(500, "<html>oops</html>").error_message(),
            "Error: 500"
        );
        // FastAPI validation errors carry a list, not a string
        assert_eq!(
            ApiResponse::new(422, r#"{"detail": [{"loc": []}]}"#).error_message(),
            "Error: 422"
        );
    }

    #[test]
    fn decodes_json_body() {
        let response = ApiResponse::new(200, r#"{"id": 5}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 5);
    }
}
