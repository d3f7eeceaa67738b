//! Client settings loading.
//!
//! Settings are layered: built-in defaults, then an optional JSON file, then
//! environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use portal_domain::settings::API_PATH;
use portal_domain::{ClientSettings, DomainError, backend_origin_for_host};
use tokio::fs;
use tracing::{debug, info};

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Overrides the API base URL.
pub const ENV_BASE_URL: &str = "PORTAL_API_BASE_URL";
/// Overrides the request timeout, in milliseconds.
pub const ENV_TIMEOUT: &str = "PORTAL_API_TIMEOUT";
/// Overrides how long queued requests wait, in milliseconds.
pub const ENV_RETRY_WAIT: &str = "PORTAL_RETRY_WAIT";
/// Host name serving the frontend, used to locate the backend.
pub const ENV_FRONTEND_HOST: &str = "PORTAL_FRONTEND_HOST";

const SETTINGS_FILE: &str = "settings.json";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// An explicitly requested settings file does not exist.
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An environment variable holds an unusable value.
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The merged settings failed validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Loads [`ClientSettings`] from file and environment.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
    explicit: bool,
    env: HashMap<String, String>,
}

impl SettingsLoader {
    /// Creates a loader reading the default settings file and the process
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
            explicit: false,
            env: std::env::vars().collect(),
        }
    }

    /// Returns the default settings file location, if a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        super::config_dir().map(|p| p.join(SETTINGS_FILE))
    }

    /// Reads settings from `path` instead. The file must exist.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self.explicit = true;
        self
    }

    /// Replaces the environment the loader reads.
    #[must_use]
    pub fn with_env<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Returns the settings file this loader reads.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads and validates the layered settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed, an explicit
    /// file is missing, an environment value is invalid, or the result fails
    /// validation.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let (mut settings, base_url_in_file) = self.read_file().await?;

        if let Some(base_url) = self.var(ENV_BASE_URL) {
            settings.base_url = base_url.to_string();
        } else if let (false, Some(host)) = (base_url_in_file, self.var(ENV_FRONTEND_HOST)) {
            settings.base_url = format!("{}{API_PATH}", backend_origin_for_host(host));
            debug!(%host, base_url = %settings.base_url, "backend derived from frontend host");
        }
        if let Some(timeout_ms) = self.millis(ENV_TIMEOUT)? {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(retry_wait_ms) = self.millis(ENV_RETRY_WAIT)? {
            settings.retry_wait_ms = retry_wait_ms;
        }

        settings.validate()?;
        info!(base_url = %settings.base_url, "settings loaded");
        Ok(settings)
    }

    /// Writes `settings` to the loader's file.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no file location or the write fails.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, to_json_stable_bytes(settings)?).await?;
        Ok(())
    }

    /// Reads the file layer. Also reports whether it set `base_url`.
    async fn read_file(&self) -> Result<(ClientSettings, bool), SettingsError> {
        let Some(path) = &self.path else {
            return Ok((ClientSettings::default(), false));
        };

        if !path.exists() {
            if self.explicit {
                return Err(SettingsError::NotFound(path.clone()));
            }
            return Ok((ClientSettings::default(), false));
        }

        let content = fs::read(path).await?;
        let value: serde_json::Value = from_json_bytes(&content)?;
        let has_base_url = value.get("base_url").is_some();
        let settings = serde_json::from_value(value)
            .map_err(|e| SettingsError::Serialization(SerializationError::Decode(e)))?;
        Ok((settings, has_base_url))
    }

    fn var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn millis(&self, name: &'static str) -> Result<Option<u64>, SettingsError> {
        self.var(name)
            .map(|value| {
                value.parse().map_err(|_| SettingsError::InvalidEnv {
                    name,
                    value: value.to_string(),
                })
            })
            .transpose()
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loader() -> SettingsLoader {
        SettingsLoader {
            path: None,
            explicit: false,
            env: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn defaults_without_file_or_env() {
        assert_eq!(loader().load().await.unwrap(), ClientSettings::default());
    }

    #[tokio::test]
    async fn env_overrides_defaults() {
        let settings = loader()
            .with_env([
                (ENV_BASE_URL, "https://api.example.com/api"),
                (ENV_TIMEOUT, "5000"),
                (ENV_RETRY_WAIT, " 250 "),
            ])
            .load()
            .await
            .unwrap();

        assert_eq!(settings.base_url, "https://api.example.com/api");
        assert_eq!(settings.timeout_ms, 5000);
        assert_eq!(settings.retry_wait_ms, 250);
    }

    #[tokio::test]
    async fn frontend_host_selects_codespaces_backend() {
        let settings = loader()
            .with_env([(ENV_FRONTEND_HOST, "fuzzy-tree-3000.app.github.dev")])
            .load()
            .await
            .unwrap();

        assert_eq!(
            settings.base_url,
            "https://fuzzy-tree-8000.app.github.dev/api"
        );
    }

    #[tokio::test]
    async fn invalid_timeout_is_reported() {
        let error = loader()
            .with_env([(ENV_TIMEOUT, "soon")])
            .load()
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            SettingsError::InvalidEnv {
                name: ENV_TIMEOUT,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn zero_retry_wait_fails_validation() {
        let error = loader()
            .with_env([(ENV_RETRY_WAIT, "0")])
            .load()
            .await
            .unwrap_err();

        assert!(matches!(error, SettingsError::Invalid(_)));
    }
}
