//! Sign-in use case.

use std::sync::Arc;

use portal_domain::{ApiRequest, LoginRequest, LoginResponse};
use serde_json::Value;
use tracing::info;

use super::decode;
use crate::error::{SessionError, SessionResult};
use crate::session::AuthSession;

const LOGIN_PATH: &str = "/auth/login";
const CURRENT_USER_PATH: &str = "/auth/me";

/// Signs users in and out of the session.
#[derive(Debug, Clone)]
pub struct AuthService {
    session: Arc<AuthSession>,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub const fn new(session: Arc<AuthSession>) -> Self {
        Self { session }
    }

    /// Posts JSON credentials and stores the issued token.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if no token came back.
    pub async fn login(&self, credentials: &LoginRequest) -> SessionResult<LoginResponse> {
        let body = serde_json::to_value(credentials)
            .map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
        self.complete_login(ApiRequest::post(LOGIN_PATH).with_json(body))
            .await
    }

    /// Posts form-encoded credentials and stores the issued token.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if no token came back.
    pub async fn login_form(&self, credentials: &LoginRequest) -> SessionResult<LoginResponse> {
        self.complete_login(ApiRequest::post(LOGIN_PATH).with_form(credentials.form_fields()))
            .await
    }

    /// Returns the profile of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns the session error, or `InvalidResponse` if the body is not JSON.
    pub async fn current_user(&self) -> SessionResult<Value> {
        let response = self.session.send(ApiRequest::get(CURRENT_USER_PATH)).await?;
        decode(&response)
    }

    /// Signs out locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed.
    pub async fn logout(&self) -> SessionResult<()> {
        self.session.logout().await
    }

    async fn complete_login(&self, request: ApiRequest) -> SessionResult<LoginResponse> {
        let response = self.session.send(request).await?;
        let login: LoginResponse = decode(&response)?;
        if login.access_token.is_empty() {
            return Err(SessionError::InvalidResponse(
                "login response has an empty access_token".to_string(),
            ));
        }
        self.session.login(&login.access_token).await?;
        info!(token_type = %login.token_type, "signed in");
        Ok(login)
    }
}
