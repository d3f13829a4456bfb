//! Error taxonomy for the session issuance handlers.
//!
//! ERROR HANDLING
//! ==============
//! Handlers return `Result<_, AuthError>`; every failure is translated into
//! one of five kinds before it reaches the browser. Server-side faults are
//! logged with their cause and answered with a generic message so backend
//! internals never leak into a response body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::envelope::Envelope;
use crate::services::identity::IdentityError;

const CONFIGURATION_MESSAGE: &str = "Server configuration error";
const NETWORK_MESSAGE: &str = "Identity service unavailable";
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Required input missing; never reaches the backend.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// `BACKEND_API_URL` is not configured. Operator fault, not a user fault.
    #[error("backend API URL not configured")]
    Configuration,

    /// The identity backend explicitly refused the request.
    #[error("backend rejected request ({status}): {message}")]
    BackendRejection { status: StatusCode, message: String },

    /// No response from the identity backend (connect failure or timeout).
    #[error("identity backend unreachable: {0}")]
    Network(String),

    /// Anything else that went wrong on the way to or from the backend.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BackendRejection { status, .. } => *status,
            Self::Configuration | Self::Network(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::BackendRejection { .. } => "BACKEND_REJECTION",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show the client.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(message) => *message,
            Self::BackendRejection { message, .. } => message.as_str(),
            Self::Configuration => CONFIGURATION_MESSAGE,
            Self::Network(_) => NETWORK_MESSAGE,
            Self::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unreachable(detail) => Self::Network(detail),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            Self::Validation(_) | Self::BackendRejection { .. } => {
                tracing::info!(code = self.error_code(), status = %self.status(), "auth request refused");
            }
            Self::Configuration | Self::Network(_) | Self::Internal(_) => {
                tracing::error!(code = self.error_code(), error = %self, "auth request failed");
            }
        }

        let body = Envelope::error(self.public_message(), self.error_code());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
