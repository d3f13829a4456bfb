//! Route guard: per-request navigation gate on session cookie presence.
//!
//! DESIGN
//! ======
//! `decide` is a pure function of `(path, has_token)`. The middleware only
//! reads the request: it never writes state and never consults the client
//! session store. Paths outside the matcher bypass the guard entirely.

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_SECURITY_POLICY,
    ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::services::session;
use crate::state::AppState;

pub const ROOT_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/auth/login";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";

const CONTENT_SECURITY_POLICY_VALUE: &str =
    "default-src 'self'; script-src 'self' 'unsafe-inline' 'unsafe-eval'; style-src 'self' 'unsafe-inline';";
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Redirect(&'static str),
    PassThrough,
}

fn is_dashboard(path: &str) -> bool {
    path == DASHBOARD_PATH
        || path
            .strip_prefix(DASHBOARD_PATH)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `path` is evaluated by the guard at all.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    path == ROOT_PATH || is_dashboard(path) || path == LOGIN_PATH || path == FORGOT_PASSWORD_PATH
}

/// Decision table, first match wins.
#[must_use]
pub fn decide(path: &str, has_token: bool) -> GuardDecision {
    if path == ROOT_PATH {
        return GuardDecision::Redirect(if has_token { DASHBOARD_PATH } else { LOGIN_PATH });
    }
    if is_dashboard(path) && !has_token {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    if (path == LOGIN_PATH || path == FORGOT_PASSWORD_PATH) && has_token {
        return GuardDecision::Redirect(DASHBOARD_PATH);
    }
    GuardDecision::PassThrough
}

/// Attach CSP and CORS headers, echoing the request origin when present.
pub(crate) fn apply_security_headers(headers: &mut HeaderMap, origin: Option<HeaderValue>) {
    headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.unwrap_or_else(|| HeaderValue::from_static("*")));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
}

/// Axum middleware wrapping every page route.
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !is_guarded(path) {
        return next.run(request).await;
    }

    let has_token = session::has_session(request.headers());
    if state.config.environment.is_development() {
        tracing::debug!(
            path = %path,
            has_token,
            timestamp = %time::OffsetDateTime::now_utc(),
            "route guard evaluated"
        );
    }

    match decide(path, has_token) {
        GuardDecision::Redirect(target) => Redirect::temporary(target).into_response(),
        GuardDecision::PassThrough => {
            let origin = request.headers().get(ORIGIN).cloned();
            let mut response = next.run(request).await;
            apply_security_headers(response.headers_mut(), origin);
            response
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
