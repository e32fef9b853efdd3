//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional, with production defaults:
//! - `DOORSTEP_CATALOG_URL` - Catalog service base URL
//! - `DOORSTEP_AUTH_URL` - Auth service base URL
//! - `DOORSTEP_HTTP_TIMEOUT_SECS` - Remote call timeout (default: 10)
//! - `DOORSTEP_TOKEN_PATH` - Session token file (default: .doorstep/token)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
const DEFAULT_AUTH_URL: &str = "https://dummyjson.com";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "10";
const DEFAULT_TOKEN_PATH: &str = ".doorstep/token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Catalog service base URL (no trailing slash)
    pub catalog_base_url: String,
    /// Auth service base URL (no trailing slash)
    pub auth_base_url: String,
    /// Timeout applied to every remote call
    pub http_timeout: Duration,
    /// Path of the persisted session token file
    pub token_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a base URL does not parse or the timeout is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog_base_url =
            get_base_url("DOORSTEP_CATALOG_URL", DEFAULT_CATALOG_URL)?;
        let auth_base_url = get_base_url("DOORSTEP_AUTH_URL", DEFAULT_AUTH_URL)?;

        let timeout_secs = get_env_or_default("DOORSTEP_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("DOORSTEP_HTTP_TIMEOUT_SECS".to_owned(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DOORSTEP_HTTP_TIMEOUT_SECS".to_owned(),
                "timeout must be positive".to_owned(),
            ));
        }

        let token_path =
            PathBuf::from(get_env_or_default("DOORSTEP_TOKEN_PATH", DEFAULT_TOKEN_PATH));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            catalog_base_url,
            auth_base_url,
            http_timeout: Duration::from_secs(timeout_secs),
            token_path,
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a base URL from the environment, validated and normalized without a
/// trailing slash.
fn get_base_url(key: &str, default: &str) -> Result<String, ConfigError> {
    let raw = get_env_or_default(key, default);
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    Ok(raw.trim_end_matches('/').to_owned())
}
