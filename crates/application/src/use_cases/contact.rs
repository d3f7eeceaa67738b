//! Contact form and site settings use case.

use std::sync::Arc;

use portal_domain::{ApiRequest, ResourceKind};
use serde_json::{Value, json};

use super::decode;
use crate::error::SessionResult;
use crate::session::AuthSession;

const CONTACT_PATH: &str = "/contact";
const COMPANY_INFO_PATH: &str = "/contact/company-info";
const ADMIN_COMPANY_INFO_PATH: &str = "/contact/admin/company-info";
const STATISTICS_PATH: &str = "/contact/statistics";
const ADMIN_STATISTICS_PATH: &str = "/contact/admin/statistics";

/// Contact submissions plus the company details shown on the site.
#[derive(Debug, Clone)]
pub struct ContactService {
    session: Arc<AuthSession>,
}

impl ContactService {
    /// Creates the service.
    #[must_use]
    pub const fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    /// Submits the public contact form.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn submit(&self, message: Value) -> SessionResult<Value> {
        let response = self
            .session
            .send(ApiRequest::post(CONTACT_PATH).with_json(message))
            .await?;
        decode(&response)
    }

    /// Returns the public company details.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn company_info(&self) -> SessionResult<Value> {
        self.fetch(COMPANY_INFO_PATH).await
    }

    /// Replaces the company details.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn update_company_info(&self, info: Value) -> SessionResult<Value> {
        self.replace(ADMIN_COMPANY_INFO_PATH, info).await
    }

    /// Returns the headline statistics.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn statistics(&self) -> SessionResult<Value> {
        self.fetch(STATISTICS_PATH).await
    }

    /// Replaces the headline statistics.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn update_statistics(&self, statistics: Value) -> SessionResult<Value> {
        self.replace(ADMIN_STATISTICS_PATH, statistics).await
    }

    /// Lists contact submissions.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn submissions(&self, query: &[(&str, &str)]) -> SessionResult<Value> {
        let request = ApiRequest::get(ResourceKind::ContactSubmissions.collection_path())
            .with_query(query.iter().copied());
        let response = self.session.send(request).await?;
        decode(&response)
    }

    /// Sets the workflow status of a submission.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn update_status(&self, id: &str, status: &str) -> SessionResult<Value> {
        let path = format!("{}/status", ResourceKind::ContactSubmissions.item_path(id));
        let request = ApiRequest::patch(path).with_json(json!({ "status": status }));
        let response = self.session.send(request).await?;
        decode(&response)
    }

    /// Deletes a submission.
    ///
    /// # Errors
    ///
    /// Returns the session error.
    pub async fn delete_submission(&self, id: &str) -> SessionResult<()> {
        self.session
            .send(ApiRequest::delete(
                ResourceKind::ContactSubmissions.item_path(id),
            ))
            .await?;
        Ok(())
    }

    async fn fetch(&self, path: &str) -> SessionResult<Value> {
        let response = self.session.send(ApiRequest::get(path)).await?;
        decode(&response)
    }

    async fn replace(&self, path: &str, body: Value) -> SessionResult<Value> {
        let response = self
            .session
            .send(ApiRequest::put(path).with_json(body))
            .await?;
        decode(&response)
    }
}
