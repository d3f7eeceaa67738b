//! Authenticated HTTP session.
//!
//! [`AuthSession`] wraps an [`HttpTransport`] and is the single place where
//! credentials are attached and `401 Unauthorized` is handled:
//!
//! - Every outbound request carries `Authorization: Bearer <token>` when a
//!   token is stored.
//! - The first 401 on a request that has not been retried invalidates the
//!   session: the token is cleared, queued requests are released, an
//!   `auth_expired` event is published and, on admin pages, the user is sent
//!   to the login page.
//! - A 401 that arrives while an invalidation is running queues and is
//!   reissued once, with whatever token the invalidation left behind.
//! - Every failure after the token is read is returned to the caller and
//!   also published on the session's [`ErrorBus`].
//!
//! The backend has no token-renewal endpoint, which is why the "refresh"
//! step is an invalidation rather than a renewal.
//!
//! # Example
//!
//! ```ignore
//! let session = AuthSession::new(settings, transport, storage, navigator);
//! session.login("abc").await?;
//! let projects = session.send(ApiRequest::get("/projects")).await?;
//! ```

mod refresh;

use std::sync::Arc;

use portal_domain::request::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE,
};
use portal_domain::{
    ApiRequest, ApiResponse, ClientSettings, ErrorEvent, GuardDecision, NavigationRules,
    RequestBody, SessionState, bearer_value,
};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::events::ErrorBus;
use crate::ports::{HttpTransport, NavigationError, Navigator, TokenStorage};
use refresh::{RefreshGate, Resolution, Ticket};

/// Message used when the session is invalidated without a triggering response.
const SESSION_ENDED: &str = "Session expired, please sign in again";

/// Authenticated HTTP session shared by everything that talks to the API.
///
/// Construct one per process and share it behind an `Arc`.
pub struct AuthSession {
    settings: ClientSettings,
    rules: NavigationRules,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    errors: ErrorBus,
    gate: RefreshGate,
}

impl AuthSession {
    /// Creates a session from its settings and adapters.
    pub fn new(
        settings: ClientSettings,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let rules = NavigationRules::from_settings(&settings);
        Self {
            settings,
            rules,
            transport,
            storage,
            navigator,
            errors: ErrorBus::new(),
            gate: RefreshGate::default(),
        }
    }

    /// Returns the session settings.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Returns the navigation rules derived from the settings.
    #[must_use]
    pub const fn rules(&self) -> &NavigationRules {
        &self.rules
    }

    /// Returns the bus every failure is published on.
    #[must_use]
    pub const fn errors(&self) -> &ErrorBus {
        &self.errors
    }

    /// Stores `token` as the authoritative credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be written.
    pub async fn login(&self, token: &str) -> SessionResult<()> {
        self.storage.set(&self.settings.token_key, token).await?;
        info!("session authenticated");
        Ok(())
    }

    /// Forgets every stored credential without publishing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a token cannot be removed.
    pub async fn logout(&self) -> SessionResult<()> {
        self.clear_tokens().await?;
        info!("session logged out");
        Ok(())
    }

    /// Returns the token attached to outbound requests, if any.
    ///
    /// The primary key wins; the fallback key is read only when the primary
    /// one is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn token(&self) -> SessionResult<Option<String>> {
        for key in [&self.settings.token_key, &self.settings.fallback_token_key] {
            if let Some(token) = self.storage.get(key).await?.filter(|t| !t.is_empty()) {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    /// Returns where the session is in its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn state(&self) -> SessionResult<SessionState> {
        if self.gate.is_refreshing() {
            return Ok(SessionState::Refreshing);
        }
        Ok(if self.token().await?.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        })
    }

    /// Returns true while an invalidation is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.gate.is_refreshing()
    }

    /// Returns how many requests are waiting for the running invalidation.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.gate.pending()
    }

    /// Returns the request as it goes on the wire.
    ///
    /// Adds the bearer credential when `token` is present, the form content
    /// type for form bodies, and JSON defaults otherwise. The body itself is
    /// never touched.
    #[must_use]
    pub fn decorate(&self, request: &ApiRequest, token: Option<&str>) -> ApiRequest {
        let mut outbound = request.clone();

        if !outbound.headers.contains(ACCEPT) {
            outbound.headers.set(ACCEPT, JSON_CONTENT_TYPE);
        }
        match &outbound.body {
            RequestBody::Form(_) => outbound.headers.set(CONTENT_TYPE, FORM_CONTENT_TYPE),
            RequestBody::Json(_) if !outbound.headers.contains(CONTENT_TYPE) => {
                outbound.headers.set(CONTENT_TYPE, JSON_CONTENT_TYPE);
            }
            _ => {}
        }
        if let Some(token) = token {
            outbound.headers.set(AUTHORIZATION, bearer_value(token));
        }

        outbound
    }

    /// Sends a request through the session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Network`] when no response was received
    ///   (`network_error` is published).
    /// - [`SessionError::Api`] for any non-2xx response. A first 401 invalidates
    ///   the session (`auth_expired`), anything else publishes `api_error`.
    /// - [`SessionError::RetryTimedOut`] when a queued request waited longer
    ///   than `retry_wait_ms` for the running invalidation (`refresh_error` is
    ///   published).
    /// - [`SessionError::Storage`] when the token cannot be read before the
    ///   first attempt. Nothing was sent, so no event is published.
    pub async fn send(&self, mut request: ApiRequest) -> SessionResult<ApiResponse> {
        let mut token = self.token().await?;

        loop {
            let outbound = self.decorate(&request, token.as_deref());
            debug!(
                id = %request.id,
                method = %request.method,
                path = %request.path,
                retried = request.is_retried(),
                "sending request"
            );

            let response = match self.transport.send(&outbound).await {
                Ok(response) => response,
                Err(error) => {
                    warn!(id = %request.id, path = %request.path, %error, "no response received");
                    self.errors.publish(&ErrorEvent::network(error.to_string()));
                    return Err(SessionError::Network(error));
                }
            };

            if response.is_success() {
                debug!(id = %request.id, status = response.status, "request succeeded");
                return Ok(response);
            }

            let message = response.error_message();
            warn!(
                id = %request.id,
                path = %request.path,
                status = response.status,
                %message,
                "request failed"
            );

            if response.is_unauthorized() && !request.is_retried() {
                request.mark_retried();
                match self.gate.enter() {
                    Ticket::Wait(receiver) => {
                        debug!(id = %request.id, "queued behind running invalidation");
                        token = self.wait_for_invalidation(receiver).await?;
                        continue;
                    }
                    Ticket::Lead => {
                        // The caller still gets the 401 when invalidation fails;
                        // that failure is already published as `refresh_error`.
                        let _ = self
                            .run_invalidation(Some(response.status), message.clone())
                            .await;
                        return Err(SessionError::api(response, message));
                    }
                }
            }

            self.errors
                .publish(&ErrorEvent::api(response.status, message.clone()));
            return Err(SessionError::api(response, message));
        }
    }

    /// Ends the session as if a 401 had been observed.
    ///
    /// Does nothing if an invalidation is already running.
    ///
    /// # Errors
    ///
    /// Returns the failure of the invalidation sequence; `refresh_error` has
    /// been published by then.
    pub async fn invalidate_session(&self) -> SessionResult<()> {
        if !self.gate.try_begin() {
            debug!("invalidation already running");
            return Ok(());
        }
        self.run_invalidation(None, SESSION_ENDED.to_string()).await
    }

    /// Checks whether `route` may be entered with the stored credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn guard(&self, route: &str) -> SessionResult<GuardDecision> {
        let has_token = self.token().await?.is_some();
        Ok(self.rules.guard(route, has_token))
    }

    /// Navigates to `route`, or to the login page if the guard refuses it.
    ///
    /// Returns the path actually entered.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or navigation fails.
    pub async fn enter_route(&self, route: &str) -> SessionResult<String> {
        let path = match self.guard(route).await? {
            GuardDecision::Proceed => route.to_string(),
            GuardDecision::Redirect(login) => {
                info!(%route, %login, "route requires credentials");
                login
            }
        };
        self.navigator.navigate(&path)?;
        if self.rules.should_log_visit(&path) {
            info!(target: "portal::visits", %path, "page visit");
        }
        Ok(path)
    }

    /// Runs the invalidation claimed through the gate.
    ///
    /// The gate is released exactly once: with the remaining token after the
    /// keys are cleared, or with no token if clearing fails. A failed redirect
    /// happens after the release and leaves the gate to whoever holds it next.
    async fn run_invalidation(&self, status: Option<u16>, message: String) -> SessionResult<()> {
        info!(?status, "invalidating session");
        let resolution = match self.clear_and_resolve().await {
            Ok(resolution) => resolution,
            Err(error) => {
                let released = self.gate.release(&None);
                return Err(self.invalidation_failed(error, released));
            }
        };

        let released = self.gate.release(&resolution);
        debug!(released, "released queued requests");
        self.errors.publish(&ErrorEvent::auth_expired(status, message));

        self.redirect_to_login()
            .map_err(|error| self.invalidation_failed(error.into(), 0))
    }

    async fn clear_and_resolve(&self) -> SessionResult<Resolution> {
        self.clear_tokens().await?;
        self.token().await
    }

    fn redirect_to_login(&self) -> Result<(), NavigationError> {
        let current = self.navigator.current_path();
        if self.rules.should_redirect_to_login(&current) {
            info!(from = %current, to = %self.rules.login_path(), "redirecting to login");
            self.navigator.navigate(self.rules.login_path())?;
        }
        Ok(())
    }

    fn invalidation_failed(&self, error: SessionError, released: usize) -> SessionError {
        warn!(%error, released, "session invalidation failed");
        self.errors.publish(&ErrorEvent::refresh(error.to_string()));
        error
    }

    async fn wait_for_invalidation(
        &self,
        receiver: tokio::sync::oneshot::Receiver<Resolution>,
    ) -> SessionResult<Resolution> {
        match tokio::time::timeout(self.settings.retry_wait(), receiver).await {
            Ok(Ok(resolution)) => Ok(resolution),
            // The gate never drops a sender without resolving it, but a
            // closed channel still means "no token".
            Ok(Err(_)) => Ok(None),
            Err(_) => {
                let error = SessionError::RetryTimedOut {
                    waited_ms: self.settings.retry_wait_ms,
                };
                warn!(%error, "gave up waiting for invalidation");
                self.errors.publish(&ErrorEvent::refresh(error.to_string()));
                Err(error)
            }
        }
    }

    async fn clear_tokens(&self) -> SessionResult<()> {
        self.storage.remove(&self.settings.token_key).await?;
        self.storage.remove(&self.settings.fallback_token_key).await?;
        Ok(())
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("settings", &self.settings)
            .field("errors", &self.errors)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::ports::TransportError;
    use async_trait::async_trait;
    use std::sync::{OnceLock, Weak};
    use pretty_assertions::assert_eq;

    struct NoTransport;

    #[async_trait]
    impl HttpTransport for NoTransport {
        async fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            Err(TransportError::Other("unused".to_string()))
        }
    }

    struct StaticNavigator;

    impl Navigator for StaticNavigator {
        fn current_path(&self) -> String {
            "/".to_string()
        }

        fn navigate(&self, _path: &str) -> Result<(), NavigationError> {
            Ok(())
        }
    }

    fn session() -> AuthSession {
        AuthSession::new(
            ClientSettings::default(),
            Arc::new(NoTransport),
            Arc::new(MemoryTokenStore::new()),
            Arc::new(StaticNavigator),
        )
    }

    #[test]
    fn decorate_attaches_bearer_token() {
        let outbound = session().decorate(&ApiRequest::get("/projects"), Some("abc"));
        assert_eq!(outbound.headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(outbound.headers.get("accept"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn decorate_without_token_adds_no_credentials() {
        let outbound = session().decorate(&ApiRequest::get("/projects"), None);
        assert!(!outbound.headers.contains(AUTHORIZATION));
        assert!(!outbound.headers.contains(CONTENT_TYPE));
    }

    #[test]
    fn decorate_sets_form_content_type() {
        let request = ApiRequest::post("/auth/login")
            .with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .with_form([("username", "admin")]);
        let outbound = session().decorate(&request, None);

        assert_eq!(outbound.headers.get("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(outbound.body, request.body);
    }

    #[test]
    fn decorate_keeps_caller_json_content_type() {
        let request = ApiRequest::post("/articles")
            .with_header(CONTENT_TYPE, "application/merge-patch+json")
            .with_json(serde_json::json!({"title": "BIM"}));
        let outbound = session().decorate(&request, Some("abc"));

        assert_eq!(
            outbound.headers.get("content-type"),
            Some("application/merge-patch+json")
        );
    }

    /// Sits on an admin page. Its redirect fails after another invalidation
    /// has claimed the gate.
    #[derive(Default)]
    struct ContendedNavigator {
        session: OnceLock<Weak<AuthSession>>,
        claimed: OnceLock<bool>,
    }

    impl Navigator for ContendedNavigator {
        fn current_path(&self) -> String {
            "/admin/users".to_string()
        }

        fn navigate(&self, _path: &str) -> Result<(), NavigationError> {
            let session = self.session.get().and_then(Weak::upgrade).unwrap();
            self.claimed.set(session.gate.try_begin()).unwrap();
            Err(NavigationError::Failed("history unavailable".to_string()))
        }
    }

    struct Unauthorized;

    #[async_trait]
    impl HttpTransport for Unauthorized {
        async fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            Ok(ApiResponse::new(401, r#"{"detail":"expired"}"#))
        }
    }

    #[tokio::test]
    async fn failed_redirect_leaves_next_invalidation_in_flight() {
        let navigator = Arc::new(ContendedNavigator::default());
        let session = Arc::new(AuthSession::new(
            ClientSettings::default(),
            Arc::new(Unauthorized),
            Arc::new(MemoryTokenStore::new()),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        ));
        navigator.session.set(Arc::downgrade(&session)).unwrap();

        let error = session.send(ApiRequest::get("/users")).await.unwrap_err();

        assert_eq!(error.status(), Some(401));
        assert_eq!(navigator.claimed.get(), Some(&true));
        assert!(session.is_refreshing());
        assert!(matches!(session.gate.enter(), Ticket::Wait(_)));
        assert_eq!(session.pending_requests(), 1);
    }

    #[tokio::test]
    async fn token_falls_back_to_secondary_key() {
        let session = session();
        assert_eq!(session.token().await.unwrap(), None);

        session.storage.set("auth_token", "visitor").await.unwrap();
        assert_eq!(session.token().await.unwrap().as_deref(), Some("visitor"));

        session.login("admin").await.unwrap();
        assert_eq!(session.token().await.unwrap().as_deref(), Some("admin"));
        assert_eq!(session.state().await.unwrap(), SessionState::Authenticated);

        session.logout().await.unwrap();
        assert_eq!(session.state().await.unwrap(), SessionState::Unauthenticated);
    }
}
