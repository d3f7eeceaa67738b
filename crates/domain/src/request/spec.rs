//! Outbound request type

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Headers, HttpMethod, RequestBody};

/// A request issued through the authenticated session.
///
/// `path` is relative to the configured API base URL. The `retried` marker
/// is owned by the session's retry guard: it starts out false and only
/// [`ApiRequest::mark_retried`] flips it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Identifier used to correlate log lines for this request
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL (e.g. `/projects`)
    pub path: String,
    /// Query string parameters, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    /// Caller-supplied headers
    #[serde(default)]
    pub headers: Headers,
    /// Request payload
    #[serde(default)]
    pub body: RequestBody,
    #[serde(default)]
    retried: bool,
}

impl ApiRequest {
    /// Creates a request with no query, headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: RequestBody::None,
            retried: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends query parameters.
    #[must_use]
    pub fn with_query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Sets a URL-encoded form body.
    #[must_use]
    pub fn with_form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::form(fields);
        self
    }

    /// Returns true once the retry guard has reissued this request.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Marks the request as retried. Idempotent.
    pub const fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_request_is_not_retried() {
        let request = ApiRequest::get("/projects");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path, "/projects");
        assert!(!request.is_retried());
    }

    #[test]
    fn mark_retried_is_idempotent() {
        let mut request = ApiRequest::delete("/articles/3");
        request.mark_retried();
        request.mark_retried();
        assert!(request.is_retried());
    }

    #[test]
    fn builders_compose() {
        let request = ApiRequest::post("/contact")
            .with_query([("lang", "fa")])
            .with_header("X-Trace", "1")
            .with_json(serde_json::json!({"name": "Sara"}));

        assert_eq!(request.query, vec![("lang".to_string(), "fa".to_string())]);
        assert_eq!(request.headers.get("x-trace"), Some("1"));
        assert!(matches!(request.body, RequestBody::Json(_)));
    }

    #[test]
    fn every_request_gets_a_distinct_id() {
        assert_ne!(ApiRequest::get("/a").id, ApiRequest::get("/a").id);
    }
}
