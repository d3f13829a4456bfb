//! Session cookie minting, clearing, and lookup.
//!
//! The `token` cookie is the only durable session artifact. Its value is the
//! opaque backend token and is never decoded; a present, non-empty value is
//! what "authenticated" means at the edge.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const SESSION_COOKIE_NAME: &str = "token";
pub const SESSION_MAX_AGE: Duration = Duration::days(7);

/// Cookie carrying a freshly issued token.
#[must_use]
pub fn session_cookie(token: impl Into<String>, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(SESSION_MAX_AGE)
        .build()
}

/// Removal cookie: empty value, `Max-Age=0`, otherwise identical attributes.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// The session token from the jar, if present and non-empty.
#[must_use]
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE_NAME)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
}

/// Presence test used by the route guard and the rehydration endpoint.
#[must_use]
pub fn has_session(headers: &HeaderMap) -> bool {
    session_token(&CookieJar::from_headers(headers)).is_some()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
