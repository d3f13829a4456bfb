//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers and the route guard via the
//! `State` extractor. It holds the process configuration and the identity
//! backend client. The backend is `None` when `BACKEND_API_URL` is not
//! configured; handlers turn that into a configuration error per request.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AuthError;
use crate::services::identity::{HttpIdentityBackend, IdentityBackend, IdentityError};

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` if the backend base URL is not configured.
    pub identity: Option<Arc<dyn IdentityBackend>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, identity: Option<Arc<dyn IdentityBackend>>) -> Self {
        Self { config: Arc::new(config), identity }
    }

    /// Build state from config, creating the HTTP identity client when a
    /// backend URL is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: AppConfig) -> Result<Self, IdentityError> {
        let identity = match &config.backend_api_url {
            Some(url) => {
                let backend = HttpIdentityBackend::new(url.clone(), config.backend_timeout)?;
                Some(Arc::new(backend) as Arc<dyn IdentityBackend>)
            }
            None => None,
        };
        Ok(Self::new(config, identity))
    }

    /// The configured identity backend.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] when no backend URL was configured.
    pub fn identity(&self) -> Result<&Arc<dyn IdentityBackend>, AuthError> {
        self.identity.as_ref().ok_or(AuthError::Configuration)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::config::Environment;
    use crate::services::identity::{BackendReply, ForgotPasswordRequest, LoginRequest};

    /// Scripted identity backend that records every call.
    pub struct MockIdentity {
        pub login_reply: Result<BackendReply, String>,
        pub logout_reply: BackendReply,
        /// Held before answering a logout, to model a hung backend.
        pub logout_delay: Option<std::time::Duration>,
        pub forgot_reply: BackendReply,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockIdentity {
        #[must_use]
        pub fn accepting(token: &str) -> Self {
            Self::with_login(BackendReply {
                status: 200,
                body: json!({ "success": true, "token": token, "message": "ok" }),
            })
        }

        #[must_use]
        pub fn with_login(reply: BackendReply) -> Self {
            Self {
                login_reply: Ok(reply),
                logout_reply: BackendReply { status: 200, body: json!({ "success": true }) },
                logout_delay: None,
                forgot_reply: BackendReply { status: 200, body: json!({ "success": true, "message": "sent" }) },
                calls: Mutex::new(Vec::new()),
            }
        }

        #[must_use]
        pub fn unreachable() -> Self {
            Self { login_reply: Err("connection refused".into()), ..Self::accepting("unused") }
        }

        /// Wait until at least `count` calls were recorded, for calls made
        /// from background tasks.
        pub async fn wait_for_calls(&self, count: usize) -> Vec<String> {
            for _ in 0..200 {
                let calls = self.calls();
                if calls.len() >= count {
                    return calls;
                }
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
            self.calls()
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("mock mutex should lock").clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().expect("mock mutex should lock").push(call);
        }
    }

    #[async_trait::async_trait]
    impl IdentityBackend for MockIdentity {
        async fn login(&self, credentials: &LoginRequest) -> Result<BackendReply, IdentityError> {
            self.record(format!("login:{}:{}", credentials.username, credentials.password));
            self.login_reply
                .clone()
                .map_err(IdentityError::Unreachable)
        }

        async fn logout(&self, token: &str) -> Result<BackendReply, IdentityError> {
            self.record(format!("logout:{token}"));
            if let Some(delay) = self.logout_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.logout_reply.clone())
        }

        async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<BackendReply, IdentityError> {
            self.record(format!("forgot:{}", request.email));
            Ok(self.forgot_reply.clone())
        }
    }

    #[must_use]
    pub fn test_config() -> AppConfig {
        AppConfig {
            backend_api_url: Some("http://identity.test".into()),
            environment: Environment::Test,
            ..AppConfig::default()
        }
    }

    /// State wired to a mock backend.
    #[must_use]
    pub fn test_app_state(identity: Arc<MockIdentity>) -> AppState {
        AppState::new(test_config(), Some(identity as Arc<dyn IdentityBackend>))
    }

    /// State with no backend URL configured.
    #[must_use]
    pub fn unconfigured_app_state() -> AppState {
        AppState::new(AppConfig { backend_api_url: None, ..test_config() }, None)
    }

    /// Stand-in page router: every guarded page answers 200 with its name.
    #[must_use]
    pub fn test_pages() -> axum::Router {
        use axum::routing::get;

        axum::Router::new()
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/dashboard/{*rest}", get(|| async { "dashboard child" }))
            .route("/auth/login", get(|| async { "login" }))
            .route("/auth/forgot-password", get(|| async { "forgot password" }))
            .route("/products", get(|| async { "products" }))
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub async fn spawn_server(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind should succeed");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server failed");
        });
        format!("http://{addr}")
    }
}
