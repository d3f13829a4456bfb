//! API gateway: the one HTTP client used by all browser-side code.
//!
//! Every call goes to `{origin}/api/...` with a JSON content type and the
//! cookie store enabled, so the httpOnly `token` cookie rides along without
//! any caller touching it.
//!
//! ERROR HANDLING
//! ==============
//! All failures pass through [`ApiGateway::intercept`], which logs them by
//! class and, on a 401 from an authenticated call, emits
//! [`AuthEvent::Unauthorized`]. The error is then returned to the caller
//! unchanged so inline feedback can still be shown.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::navigation::{AuthEvent, AuthEvents};
use crate::envelope::{ApiResponse, Envelope, SessionStatus};

pub const DEFAULT_BASE_PATH: &str = "/api";

/// Credential endpoints. A 401 here is a rejected form, not an expired
/// session, so it is returned to the caller without an auth event.
const CREDENTIAL_PATHS: &[&str] = &["/auth/login", "/auth/forgot-password"];

fn is_credential_path(path: &str) -> bool {
    let path = format!("/{}", path.trim_start_matches('/'));
    CREDENTIAL_PATHS.contains(&path.as_str())
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Scheme and authority of the app, e.g. `https://shop.example`.
    pub origin: String,
    pub base_path: String,
    pub timeout: Option<Duration>,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self { origin: origin.into(), base_path: DEFAULT_BASE_PATH.to_owned(), timeout: None }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn base_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.base_path.trim_end_matches('/'))
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built or sent.
    #[error("request error: {0}")]
    Request(String),

    /// A 2xx body that is not a valid envelope.
    #[error("response decode failed: {0}")]
    Decode(String),
}

impl GatewayError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() { Self::Request(err.to_string()) } else { Self::Network(err.to_string()) }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Server-provided message from an error envelope, for inline display.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.message)
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Clone is cheap: `reqwest::Client` shares its pool and cookie store.
#[derive(Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    base_url: String,
    events: AuthEvents,
}

impl ApiGateway {
    /// Build the gateway. `events` receives an [`AuthEvent`] for every 401.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Request`] if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig, events: AuthEvents) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url(), events })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Auth calls
    // -------------------------------------------------------------------------

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`]; a rejected login arrives as `Status`.
    pub async fn login(&self, username: &str, password: &str) -> Result<ApiResponse<()>, GatewayError> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(Method::POST, "/auth/login", Some(&body)).await
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn logout(&self) -> Result<ApiResponse<()>, GatewayError> {
        self.send(Method::POST, "/auth/logout", None::<&()>)
            .await
    }

    /// `POST /auth/forgot-password`. The payload is whatever the backend sent.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn forgot_password(&self, email: &str) -> Result<ApiResponse<serde_json::Value>, GatewayError> {
        let body = serde_json::json!({ "email": email });
        self.send(Method::POST, "/auth/forgot-password", Some(&body))
            .await
    }

    /// `GET /auth/session`: whether the session cookie is present.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn session(&self) -> Result<ApiResponse<SessionStatus>, GatewayError> {
        self.send(Method::GET, "/auth/session", None::<&()>)
            .await
    }

    // -------------------------------------------------------------------------
    // Generic calls
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, GatewayError> {
        self.send(Method::GET, path, None::<&()>).await
    }

    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    ///
    /// Any [`GatewayError`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, GatewayError> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiResponse<T>, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body)
            .await
            .map_err(|err| self.intercept(path, err))
    }

    async fn execute<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiResponse<T>, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(GatewayError::from_transport)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(GatewayError::from_transport)?;

        if !status.is_success() {
            return Err(GatewayError::Status { status: status.as_u16(), body: text });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Central failure handler. Logs by class, signals 401s on authenticated
    /// calls, hands the error back.
    fn intercept(&self, path: &str, err: GatewayError) -> GatewayError {
        match &err {
            GatewayError::Status { status, body } => {
                tracing::error!(status, body = %body, "API error");
                if *status == 401 && !is_credential_path(path) {
                    self.events.emit(AuthEvent::Unauthorized);
                }
            }
            GatewayError::Network(detail) => {
                tracing::error!(error = %detail, "network error: no response received");
            }
            GatewayError::Request(detail) => {
                tracing::error!(error = %detail, "request could not be sent");
            }
            GatewayError::Decode(detail) => {
                tracing::error!(error = %detail, "response body is not a valid envelope");
            }
        }
        err
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
