//! JSON response envelope shared by the local API and its client.
//!
//! On the wire every local endpoint answers `{ success, data?, message?,
//! code? }`. Clients decode it into [`ApiResponse`], which forces a branch on
//! `success` before `data` can be touched.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Wire form of every local API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Envelope<()> {
    /// Successful response carrying only a human-readable message.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, data: None, message: Some(message.into()), code: None }
    }

    /// Failed response with a message and a machine-readable error code.
    #[must_use]
    pub fn error(message: impl Into<String>, code: &str) -> Self {
        Self { success: false, data: None, message: Some(message.into()), code: Some(code.to_owned()) }
    }
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn data(data: T) -> Self {
        Self { success: true, data: Some(data), message: None, code: None }
    }
}

/// Payload of `GET /api/auth/session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

/// Decoded envelope. Callers must match on the variant before using `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    Success { data: T, message: Option<String> },
    Failure { message: String, code: Option<String> },
}

const FALLBACK_FAILURE_MESSAGE: &str = "Request failed";

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Consume the response, keeping `data` only when it succeeded.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Failure { message, .. } => Some(message),
        }
    }
}

impl<'de, T> Deserialize<'de> for ApiResponse<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Envelope::<serde_json::Value>::deserialize(deserializer)?;
        if raw.success {
            // Endpoints without a payload omit `data`; `()` decodes from null.
            let data = T::deserialize(raw.data.unwrap_or(serde_json::Value::Null)).map_err(serde::de::Error::custom)?;
            Ok(Self::Success { data, message: raw.message })
        } else {
            Ok(Self::Failure {
                message: raw
                    .message
                    .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_owned()),
                code: raw.code,
            })
        }
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
