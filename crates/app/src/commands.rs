//! Command execution.

use std::sync::Arc;

use anyhow::Context as _;
use portal_application::{
    AuthService, AuthSession, ContentService, ErrorListener, HttpTransport, Navigator,
    TokenStorage, ToastQueue,
};
use portal_domain::{ApiRequest, ClientSettings, ErrorEvent, LoginRequest, RequestBody};
use portal_infrastructure::{
    FileTokenStore, HistoryNavigator, ReqwestTransport, SettingsLoader, SystemClock,
};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::cli::{Cli, Command};

/// Runs one command and prints its result as JSON.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = Client::build(&cli).await?;
    let result = client.execute(cli.command).await;
    client.report();
    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(())
}

/// A session plus the adapters the CLI inspects after a command.
pub struct Client {
    session: Arc<AuthSession>,
    navigator: Arc<HistoryNavigator>,
    toasts: Arc<ToastQueue>,
}

impl Client {
    async fn build(cli: &Cli) -> anyhow::Result<Self> {
        let mut loader = SettingsLoader::new();
        if let Some(path) = &cli.config {
            loader = loader.with_path(path);
        }
        let settings = loader.load().await.context("loading settings")?;

        let token_path = match &cli.token_file {
            Some(path) => path.clone(),
            None => FileTokenStore::default_path()
                .context("no config directory found; pass --token-file")?,
        };
        let transport = ReqwestTransport::new(&settings)?;

        Ok(Self::with_parts(
            settings,
            Arc::new(transport),
            Arc::new(FileTokenStore::new(token_path)),
            &cli.page,
        ))
    }

    fn with_parts(
        settings: ClientSettings,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
        page: &str,
    ) -> Self {
        let navigator = Arc::new(HistoryNavigator::new(page));
        let session = Arc::new(AuthSession::new(
            settings,
            transport,
            storage,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        ));
        let toasts = Arc::new(ToastQueue::new(Arc::new(SystemClock::new())));

        session.errors().subscribe(Arc::new(|event: &ErrorEvent| {
            warn!(kind = %event.kind, status = ?event.status, message = %event.message, "api failure");
        }));
        session
            .errors()
            .subscribe(Arc::clone(&toasts) as Arc<dyn ErrorListener>);

        Self {
            session,
            navigator,
            toasts,
        }
    }

    async fn execute(&self, command: Command) -> anyhow::Result<Value> {
        let session = Arc::clone(&self.session);
        let value = match command {
            Command::Login {
                username,
                password,
                json,
            } => {
                let auth = AuthService::new(session);
                let credentials = LoginRequest::new(username, password);
                let login = if json {
                    auth.login(&credentials).await?
                } else {
                    auth.login_form(&credentials).await?
                };
                json!({ "token_type": login.token_type, "user": login.user })
            }
            Command::Logout => {
                AuthService::new(session).logout().await?;
                json!({ "logged_out": true })
            }
            Command::Me => AuthService::new(session).current_user().await?,
            Command::List { resource, query } => {
                let query: Vec<(&str, &str)> = query
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                ContentService::new(session, resource).list(&query).await?
            }
            Command::Get { resource, id } => {
                ContentService::new(session, resource).get(&id).await?
            }
            Command::Delete { resource, id } => {
                ContentService::new(session, resource).delete(&id).await?;
                json!({ "deleted": id })
            }
            Command::Request { method, path, json } => {
                let mut request = ApiRequest::new(method, path);
                if let Some(body) = json {
                    request.body = RequestBody::Json(body);
                }
                let response = session.send(request).await?;
                let body = response
                    .json::<Value>()
                    .unwrap_or_else(|_| Value::String(response.body.clone()));
                json!({ "status": response.status, "body": body })
            }
        };
        Ok(value)
    }

    /// Prints the failures collected on the error bus and any forced
    /// navigation to stderr.
    fn report(&self) {
        for toast in self.toasts.active() {
            eprintln!("{}: {}", toast.level, toast.message);
        }
        let current = self.navigator.current_path();
        if current == self.session.rules().login_path() {
            info!(page = %current, "session ended");
            eprintln!("session expired; run `portal login <username> <password>`");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portal_application::{MemoryTokenStore, TransportError};
    use portal_domain::{ApiResponse, ResourceKind};
    use pretty_assertions::assert_eq;

    struct Fixed(u16, &'static str);

    #[async_trait]
    impl HttpTransport for Fixed {
        async fn send(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
            Ok(ApiResponse::new(self.0, self.1))
        }
    }

    fn client(status: u16, body: &'static str, storage: Arc<dyn TokenStorage>) -> Client {
        Client::with_parts(
            ClientSettings::default(),
            Arc::new(Fixed(status, body)),
            storage,
            "/admin",
        )
    }

    #[tokio::test]
    async fn list_returns_decoded_body() {
        let client = client(200, r#"[{"id":1}]"#, Arc::new(MemoryTokenStore::new()));
        let value = client
            .execute(Command::List {
                resource: ResourceKind::Projects,
                query: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(value, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn raw_request_keeps_non_json_body() {
        let client = client(200, "pong", Arc::new(MemoryTokenStore::new()));
        let value = client
            .execute(Command::Request {
                method: portal_domain::HttpMethod::Get,
                path: "/health".to_string(),
                json: None,
            })
            .await
            .unwrap();

        assert_eq!(value, json!({"status": 200, "body": "pong"}));
    }

    #[tokio::test]
    async fn expired_token_becomes_toast_and_login_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.set("admin_token", "old").await.unwrap();
        let client = client(401, r#"{"detail":"Token expired"}"#, Arc::new(store));

        let result = client.execute(Command::Me).await;

        assert!(result.is_err());
        assert_eq!(client.navigator.current_path(), "/admin/login");
        let toasts = client.toasts.active();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Token expired");
        assert_eq!(client.session.token().await.unwrap(), None);
    }
}
