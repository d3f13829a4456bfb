//! Process configuration parsed once from environment variables.
//!
//! DESIGN
//! ======
//! `AppConfig` is built in `main` and injected into handlers through
//! `AppState`. Nothing downstream reads the environment at request time, so
//! the "backend not configured" path is exercised by building a config with
//! `backend_api_url: None`.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SITE_DIR: &str = "public";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown NODE_ENV: {0}")]
    UnknownEnvironment(String),
    #[error("invalid {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime environment, mirroring the `NODE_ENV` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Upstream identity service base URL, without a trailing slash.
    pub backend_api_url: Option<String>,
    pub environment: Environment,
    /// Explicit `COOKIE_SECURE` override; `None` follows the environment.
    pub cookie_secure_override: Option<bool>,
    pub backend_timeout: Duration,
    pub port: u16,
    pub site_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_api_url: None,
            environment: Environment::default(),
            cookie_secure_override: None,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            port: DEFAULT_PORT,
            site_dir: PathBuf::from(DEFAULT_SITE_DIR),
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `BACKEND_API_URL`: identity service base URL (login is refused without it)
    /// - `NODE_ENV`: `development` (default), `production`, or `test`
    /// - `COOKIE_SECURE`: boolean override for the session cookie `Secure` flag
    /// - `BACKEND_TIMEOUT_SECS`: default 30
    /// - `PORT`: default 3000
    /// - `SITE_DIR`: static page directory, default `public`
    ///
    /// # Errors
    ///
    /// Returns an error if `NODE_ENV`, `PORT`, or `BACKEND_TIMEOUT_SECS` is set
    /// to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_api_url = std::env::var("BACKEND_API_URL")
            .ok()
            .as_deref()
            .and_then(normalize_base_url);
        let environment = parse_environment(std::env::var("NODE_ENV").ok().as_deref())?;
        let backend_timeout_secs = env_parse("BACKEND_TIMEOUT_SECS", DEFAULT_BACKEND_TIMEOUT_SECS)?;
        if backend_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue { var: "BACKEND_TIMEOUT_SECS", value: "0".into() });
        }
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let site_dir = std::env::var("SITE_DIR").map_or_else(|_| PathBuf::from(DEFAULT_SITE_DIR), PathBuf::from);

        Ok(Self {
            backend_api_url,
            environment,
            cookie_secure_override: env_bool("COOKIE_SECURE"),
            backend_timeout: Duration::from_secs(backend_timeout_secs),
            port,
            site_dir,
        })
    }

    /// Whether the session cookie carries the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure_override
            .unwrap_or_else(|| self.environment.is_production())
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| parse_bool(&raw))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_environment(raw: Option<&str>) -> Result<Environment, ConfigError> {
    match raw.map(str::trim).unwrap_or("development") {
        "" | "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::UnknownEnvironment(other.to_owned())),
    }
}

fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
