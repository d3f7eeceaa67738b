//! HTTP Request body types

use serde::{Deserialize, Serialize};

/// Content type for JSON payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type for URL-encoded form payloads.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Payload of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON document
    Json(serde_json::Value),
    /// URL-encoded form fields, in order
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Creates a form body from key/value pairs.
    #[must_use]
    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns whether the body is absent.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns true for URL-encoded form payloads.
    #[must_use]
    pub const fn is_form(&self) -> bool {
        matches!(self, Self::Form(_))
    }

    /// Returns the content type implied by the payload.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some(JSON_CONTENT_TYPE),
            Self::Form(_) => Some(FORM_CONTENT_TYPE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_body_content_type() {
        let body = RequestBody::Json(serde_json::json!({"title": "BIM"}));
        assert_eq!(body.content_type(), Some(JSON_CONTENT_TYPE));
        assert!(!body.is_form());
    }

    #[test]
    fn form_body_content_type() {
        let body = RequestBody::form([("username", "admin"), ("password", "secret")]);
        assert_eq!(body.content_type(), Some(FORM_CONTENT_TYPE));
        assert!(body.is_form());
    }

    #[test]
    fn empty_body_has_no_content_type() {
        let body = RequestBody::None;
        assert!(body.is_none());
        assert_eq!(body.content_type(), None);
    }
}
