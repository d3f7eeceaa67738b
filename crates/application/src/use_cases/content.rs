//! Content resource use case.

use std::sync::Arc;

use portal_domain::{ApiRequest, ResourceKind};
use serde_json::Value;

use super::decode;
use crate::error::SessionResult;
use crate::session::AuthSession;

/// CRUD access to one content resource.
///
/// Reads are public on the backend; writes need an admin token, which the
/// session attaches automatically.
#[derive(Debug, Clone)]
pub struct ContentService {
    session: Arc<AuthSession>,
    kind: ResourceKind,
}

impl ContentService {
    /// Creates a service for `kind`.
    #[must_use]
    pub const fn new(session: Arc<AuthSession>, kind: ResourceKind) -> Self {
        Self { session, kind }
    }

    /// Returns the resource this service manages.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Lists items, filtered by `query`.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn list(&self, query: &[(&str, &str)]) -> SessionResult<Value> {
        let request =
            ApiRequest::get(self.kind.collection_path()).with_query(query.iter().copied());
        let response = self.session.send(request).await?;
        decode(&response)
    }

    /// Fetches one item by id or slug.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn get(&self, id_or_slug: &str) -> SessionResult<Value> {
        let response = self
            .session
            .send(ApiRequest::get(self.kind.item_path(id_or_slug)))
            .await?;
        decode(&response)
    }

    /// Creates an item.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn create(&self, item: Value) -> SessionResult<Value> {
        let request = ApiRequest::post(self.kind.collection_path()).with_json(item);
        let response = self.session.send(request).await?;
        decode(&response)
    }

    /// Replaces an item.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn update(&self, id: &str, item: Value) -> SessionResult<Value> {
        let request = ApiRequest::put(self.kind.item_path(id)).with_json(item);
        let response = self.session.send(request).await?;
        decode(&response)
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns the session error.
    pub async fn delete(&self, id: &str) -> SessionResult<()> {
        self.session
            .send(ApiRequest::delete(self.kind.item_path(id)))
            .await?;
        Ok(())
    }
}
