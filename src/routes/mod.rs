//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The local auth API lives under `/api/auth`. Page rendering is an external
//! collaborator: `app` takes the page router as an argument (static files
//! from `SITE_DIR` in production) and wraps everything in the route guard so
//! no guarded navigation reaches a page without passing the cookie check.

pub mod auth;
pub mod guard;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Local auth API routes.
fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/session", get(auth::session_status))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Full application: auth API + guarded pages.
pub fn app(state: AppState, pages: Router) -> Router {
    api_routes(state.clone())
        .merge(pages)
        .layer(middleware::from_fn_with_state(state, guard::route_guard))
        .layer(TraceLayer::new_for_http())
}

/// Static page router serving `dir`, with `index.html` for directories.
pub fn site_pages(dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
