//! Form-level flows that drive the session store from gateway outcomes.
//!
//! The store is only written here after the server has answered. A rejected
//! login leaves `is_authenticated` alone and records the message for inline
//! display.

use super::api::{ApiGateway, GatewayError};
use super::navigation::Navigator;
use super::state::SessionStore;
use crate::envelope::ApiResponse;
use crate::routes::guard::{DASHBOARD_PATH, LOGIN_PATH};

const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Outcome of a submit, for the form to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Done { message: Option<String> },
    Rejected { message: String },
}

fn failure_message(err: &GatewayError, fallback: &str) -> String {
    err.message().unwrap_or_else(|| fallback.to_owned())
}

/// One-time rehydration after mount: ask the server whether the session
/// cookie is present and mirror the answer into the store.
///
/// # Errors
///
/// Returns the gateway error after recording it in the store.
pub async fn rehydrate(store: &SessionStore, gateway: &ApiGateway) -> Result<bool, GatewayError> {
    store.set_is_loading(true);
    let result = gateway.session().await;

    let outcome = match result {
        Ok(ApiResponse::Success { data, .. }) => {
            store.set_is_authenticated(data.authenticated);
            if !data.authenticated {
                store.set_user(None);
            }
            store.set_error(None);
            Ok(data.authenticated)
        }
        Ok(ApiResponse::Failure { message, .. }) => {
            store.set_is_authenticated(false);
            store.set_error(Some(message));
            Ok(false)
        }
        Err(err) => {
            store.set_error(Some(err.to_string()));
            Err(err)
        }
    };

    store.set_is_loading(false);
    outcome
}

/// Submit the login form. On success the store is marked authenticated and
/// the navigator moves to the dashboard.
///
/// # Errors
///
/// Network and local faults are returned; rejections come back as
/// [`FlowOutcome::Rejected`].
pub async fn sign_in(
    store: &SessionStore,
    gateway: &ApiGateway,
    navigator: &dyn Navigator,
    username: &str,
    password: &str,
) -> Result<FlowOutcome, GatewayError> {
    store.set_is_loading(true);
    store.set_error(None);
    let result = gateway.login(username, password).await;
    store.set_is_loading(false);

    match result {
        Ok(ApiResponse::Success { message, .. }) => {
            store.set_is_authenticated(true);
            navigator.navigate(DASHBOARD_PATH);
            Ok(FlowOutcome::Done { message })
        }
        Ok(ApiResponse::Failure { message, .. }) => {
            store.set_error(Some(message.clone()));
            Ok(FlowOutcome::Rejected { message })
        }
        Err(err @ GatewayError::Status { .. }) => {
            let message = failure_message(&err, LOGIN_FAILED_MESSAGE);
            store.set_error(Some(message.clone()));
            Ok(FlowOutcome::Rejected { message })
        }
        Err(err) => {
            store.set_error(Some(err.to_string()));
            Err(err)
        }
    }
}

/// Log out on the server, clear the store, and return to the login page.
/// The store is cleared even if the call fails: the cookie is the authority
/// and a stale cache must not outlive a logout attempt.
///
/// # Errors
///
/// Returns the gateway error after local state has been cleared.
pub async fn sign_out(store: &SessionStore, gateway: &ApiGateway, navigator: &dyn Navigator) -> Result<(), GatewayError> {
    let result = gateway.logout().await;
    store.logout();
    navigator.navigate(LOGIN_PATH);
    result.map(|_| ())
}

/// Submit the forgot-password form.
///
/// # Errors
///
/// Network and local faults are returned; rejections come back as
/// [`FlowOutcome::Rejected`].
pub async fn request_password_reset(gateway: &ApiGateway, email: &str) -> Result<FlowOutcome, GatewayError> {
    match gateway.forgot_password(email).await {
        Ok(ApiResponse::Success { message, .. }) => Ok(FlowOutcome::Done { message }),
        Ok(ApiResponse::Failure { message, .. }) => Ok(FlowOutcome::Rejected { message }),
        Err(err @ GatewayError::Status { .. }) => {
            Ok(FlowOutcome::Rejected { message: failure_message(&err, "Request failed") })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "flows_test.rs"]
mod tests;
