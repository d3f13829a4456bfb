//! Identity backend adapter.
//!
//! Thin forwarder for `POST {BACKEND_API_URL}/login`, `/logout`, and
//! `/forgot-password`. It carries no logic beyond pass-through: the upstream
//! status code and JSON body are handed back untouched in a [`BackendReply`]
//! for the route handlers to interpret.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No response arrived: connection refused, DNS failure, or timeout.
    #[error("identity backend unreachable: {0}")]
    Unreachable(String),

    /// The request failed for another transport reason.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The backend answered with a body that is not JSON.
    #[error("identity response parse failed (status {status}): {detail}")]
    InvalidBody { status: u16, detail: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

fn classify_transport(err: reqwest::Error) -> IdentityError {
    if err.is_timeout() || err.is_connect() {
        IdentityError::Unreachable(err.to_string())
    } else {
        IdentityError::Request(err.to_string())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Login credentials. Lives only for the duration of one submit.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Raw upstream answer: HTTP status plus the decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl BackendReply {
    #[must_use]
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `success` flag in the body. Anything but literal `true` is a failure.
    #[must_use]
    pub fn success(&self) -> bool {
        self.body.get("success").and_then(serde_json::Value::as_bool) == Some(true)
    }

    /// The issued token, if present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.body
            .get("token")
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

pub(crate) fn parse_reply(status: u16, text: &str) -> Result<BackendReply, IdentityError> {
    let body = serde_json::from_str(text).map_err(|e| IdentityError::InvalidBody { status, detail: e.to_string() })?;
    Ok(BackendReply { status, body })
}

// =============================================================================
// TRAIT
// =============================================================================

/// Upstream identity service contract.
#[async_trait::async_trait]
pub trait IdentityBackend: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<BackendReply, IdentityError>;

    /// Revoke `token` upstream.
    async fn logout(&self, token: &str) -> Result<BackendReply, IdentityError>;

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<BackendReply, IdentityError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpIdentityBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityBackend {
    /// Build a client for `base_url` (no trailing slash) with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B>(&self, endpoint: &str, body: &B, bearer: Option<&str>) -> Result<BackendReply, IdentityError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify_transport)?;

        tracing::debug!(%endpoint, status, "identity backend responded");
        parse_reply(status, &text)
    }
}

#[async_trait::async_trait]
impl IdentityBackend for HttpIdentityBackend {
    async fn login(&self, credentials: &LoginRequest) -> Result<BackendReply, IdentityError> {
        self.post("login", credentials, None).await
    }

    async fn logout(&self, token: &str) -> Result<BackendReply, IdentityError> {
        self.post("logout", &serde_json::json!({}), Some(token))
            .await
    }

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<BackendReply, IdentityError> {
        self.post("forgot-password", request, None).await
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
