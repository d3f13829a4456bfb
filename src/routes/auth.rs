//! Auth routes: login, logout, password reset request, session check.
//!
//! These are the only call sites that write the `token` cookie: a successful
//! login mints it and logout clears it. Every other path leaves the cookie
//! untouched.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;

use crate::envelope::{Envelope, SessionStatus};
use crate::error::AuthError;
use crate::services::identity::{ForgotPasswordRequest, LoginRequest};
use crate::services::session;
use crate::state::AppState;

const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

/// Decode a JSON body; anything unreadable counts as empty input.
fn parse_body<T>(body: &Bytes) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_slice(body).unwrap_or_default()
}

fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: forward credentials, mint the session cookie on success.
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<(CookieJar, Json<Envelope<()>>), AuthError> {
    let credentials: LoginRequest = parse_body(&body);
    // A whitespace-only username counts as missing; the password is taken as typed.
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(AuthError::Validation("Username and password are required"));
    }

    let backend = state.identity()?;
    let reply = backend.login(&credentials).await?;

    if !reply.is_success_status() {
        return Err(AuthError::BackendRejection {
            status: upstream_status(reply.status),
            message: reply
                .message()
                .unwrap_or(LOGIN_FALLBACK_MESSAGE)
                .to_owned(),
        });
    }

    let token = match reply.token() {
        Some(token) if reply.success() => token.to_owned(),
        _ => {
            return Err(AuthError::BackendRejection {
                status: StatusCode::UNAUTHORIZED,
                message: reply
                    .message()
                    .unwrap_or(LOGIN_FALLBACK_MESSAGE)
                    .to_owned(),
            });
        }
    };

    tracing::info!("login succeeded, session cookie issued");
    let jar = CookieJar::new().add(session::session_cookie(token, state.config.cookie_secure()));
    Ok((jar, Json(Envelope::ok("Login successful"))))
}

/// `POST /api/auth/logout`: clear the session cookie. Always succeeds.
///
/// When a token is present and a backend is configured, the token is revoked
/// upstream in a background task; the response never waits on it.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let (Some(token), Some(backend)) = (session::session_token(&jar), state.identity.clone()) {
        let token = token.to_owned();
        tokio::spawn(async move {
            match backend.logout(&token).await {
                Ok(reply) if reply.is_success_status() => {
                    tracing::debug!("backend session revoked");
                }
                Ok(reply) => {
                    tracing::warn!(status = reply.status, "backend session revocation refused");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "backend session revocation failed");
                }
            }
        });
    }

    let jar = CookieJar::new().add(session::clear_session_cookie(state.config.cookie_secure()));
    (jar, Json(Envelope::ok("Logged out successfully")))
}

/// `POST /api/auth/forgot-password`: proxy the backend's status and body verbatim.
pub async fn forgot_password(State(state): State<AppState>, body: Bytes) -> Result<Response, AuthError> {
    let request: ForgotPasswordRequest = parse_body(&body);
    // Whitespace-only counts as missing.
    if request.email.trim().is_empty() {
        return Err(AuthError::Validation("Email is required"));
    }

    let backend = state.identity()?;
    let reply = backend.forgot_password(&request).await?;

    tracing::info!(status = reply.status, "password reset request forwarded");
    Ok((upstream_status(reply.status), Json(reply.body)).into_response())
}

/// `GET /api/auth/session`: report whether a session cookie is present.
///
/// Used by the client store's rehydration step; the token itself is never
/// echoed.
pub async fn session_status(jar: CookieJar) -> Json<Envelope<SessionStatus>> {
    let authenticated = session::session_token(&jar).is_some();
    Json(Envelope::data(SessionStatus { authenticated }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
