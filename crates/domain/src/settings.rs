//! Client Settings Domain Model
//!
//! Defines how the session reaches the backend and where credentials live.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Backend origin used when nothing else is configured.
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8000";
/// Path under the backend origin where the API is mounted.
pub const API_PATH: &str = "/api";

/// Frontend dev ports that Codespaces exposes as `<name>-<port>.app.github.dev`.
#[allow(clippy::expect_used)]
static CODESPACES_FRONTEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(3000|3001)\.app\.github\.dev$").expect("valid regex"));

/// Settings for the authenticated API session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL every request path is joined onto.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// How long a queued request waits for an in-progress invalidation.
    pub retry_wait_ms: u64,
    /// Storage key of the primary credential.
    pub token_key: String,
    /// Storage key consulted when the primary credential is absent.
    pub fallback_token_key: String,
    /// Path of the login page.
    pub login_path: String,
    /// Prefix of every admin page.
    pub admin_prefix: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: format!("{DEFAULT_BACKEND_ORIGIN}{API_PATH}"),
            timeout_ms: 30_000,
            retry_wait_ms: 30_000,
            token_key: "admin_token".to_string(),
            fallback_token_key: "auth_token".to_string(),
            login_path: "/admin/login".to_string(),
            admin_prefix: "/admin".to_string(),
        }
    }
}

impl ClientSettings {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the bound on waiting for an invalidation to finish.
    #[must_use]
    pub const fn retry_wait(&self) -> Duration {
        Duration::from_millis(self.retry_wait_ms)
    }

    /// Parses the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn parsed_base_url(&self) -> DomainResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> DomainResult<()> {
        self.parsed_base_url()?;
        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be greater than zero"));
        }
        if self.retry_wait_ms == 0 {
            return Err(invalid("retry_wait_ms", "must be greater than zero"));
        }
        if self.token_key.is_empty() {
            return Err(invalid("token_key", "must not be empty"));
        }
        if !self.login_path.starts_with('/') {
            return Err(invalid("login_path", "must start with `/`"));
        }
        if !self.admin_prefix.starts_with('/') {
            return Err(invalid("admin_prefix", "must start with `/`"));
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: &str) -> DomainError {
    DomainError::InvalidSetting {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Derives the backend origin from the host name serving the frontend.
///
/// Inside GitHub Codespaces the frontend runs on port 3000 or 3001 and the
/// backend on 8000 of the same workspace; everywhere else the backend is
/// expected on localhost.
#[must_use]
pub fn backend_origin_for_host(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    if host.contains("github.dev") {
        let backend = CODESPACES_FRONTEND.replace(host, "-8000.app.github.dev");
        return format!("https://{backend}");
    }
    DEFAULT_BACKEND_ORIGIN.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let settings = ClientSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.base_url, "http://localhost:8000/api");
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"base_url": "https://api.example.com/api"}"#).unwrap();
        assert_eq!(settings.base_url, "https://api.example.com/api");
        assert_eq!(settings.token_key, "admin_token");
        assert_eq!(settings.login_path, "/admin/login");
    }

    #[test]
    fn rejects_bad_values() {
        let settings = ClientSettings {
            base_url: "ftp://example.com".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(settings.validate(), Err(DomainError::InvalidUrl(_))));

        let settings = ClientSettings {
            timeout_ms: 0,
            ..ClientSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(DomainError::InvalidSetting { name, .. }) if name == "timeout_ms"
        ));
    }

    #[test]
    fn codespaces_frontend_maps_to_backend_port() {
        assert_eq!(
            backend_origin_for_host("fuzzy-space-3000.app.github.dev"),
            "https://fuzzy-space-8000.app.github.dev"
        );
        assert_eq!(
            backend_origin_for_host("fuzzy-space-3001.app.github.dev:443"),
            "https://fuzzy-space-8000.app.github.dev"
        );
    }

    #[test]
    fn other_hosts_use_localhost() {
        assert_eq!(backend_origin_for_host("example.com"), "http://localhost:8000");
        assert_eq!(backend_origin_for_host("localhost:5173"), "http://localhost:8000");
    }
}
