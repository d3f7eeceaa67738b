//! In-memory token storage.
//!
//! A thread-safe [`TokenStorage`] that lives only as long as the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{StorageError, TokenStorage};

/// Thread-safe in-memory token store.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    /// Create an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one value.
    #[must_use]
    pub fn with_token(key: impl Into<String>, token: impl Into<String>) -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(key.into(), token.into());
        Self {
            tokens: Arc::new(RwLock::new(tokens)),
        }
    }

    /// Clear all tokens.
    pub async fn clear(&self) {
        let mut tokens = self.tokens.write().await;
        tokens.clear();
    }

    /// Get count of stored tokens.
    pub async fn count(&self) -> usize {
        let tokens = self.tokens.read().await;
        tokens.len()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut tokens = self.tokens.write().await;
        tokens.remove(key);
        Ok(())
    }
}
