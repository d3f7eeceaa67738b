//! Token persistence.
//!
//! Stores credentials as a JSON object in the platform config directory:
//! - Linux/macOS: ~/.config/portal/tokens.json
//! - Windows: %APPDATA%/portal/tokens.json

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use portal_application::ports::{StorageError, TokenStorage};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

const TOKEN_FILE: &str = "tokens.json";

type TokenMap = BTreeMap<String, String>;

/// `TokenStorage` persisted to a JSON file.
///
/// A missing file reads as empty. Writes replace the whole file and create
/// its parent directory on demand.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the default token file location, if a config dir exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        super::config_dir().map(|p| p.join(TOKEN_FILE))
    }

    /// Returns the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<TokenMap, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(TokenMap::new()),
            Ok(bytes) => from_json_bytes(&bytes).map_err(serialization),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(TokenMap::new()),
            Err(e) => Err(io_error(&e)),
        }
    }

    async fn write(&self, tokens: &TokenMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| io_error(&e))?;
        }
        let content = to_json_stable_bytes(tokens).map_err(serialization)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| io_error(&e))?;
        debug!(path = %self.path.display(), entries = tokens.len(), "token file written");
        Ok(())
    }
}

fn io_error(error: &io::Error) -> StorageError {
    StorageError::Io(error.to_string())
}

#[allow(clippy::needless_pass_by_value)]
fn serialization(error: SerializationError) -> StorageError {
    StorageError::Serialization(error.to_string())
}

#[async_trait]
impl TokenStorage for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut tokens = self.read().await?;
        tokens.insert(key.to_string(), value.to_string());
        self.write(&tokens).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut tokens = self.read().await?;
        if tokens.remove(key).is_some() {
            self.write(&tokens).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_portal_dir() {
        if let Some(p) = FileTokenStore::default_path() {
            assert!(p.ends_with("portal/tokens.json"));
        }
    }
}
