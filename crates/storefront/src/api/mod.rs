//! HTTP client for the remote catalog and auth services.
//!
//! Uses a single `reqwest` client with a bounded timeout. Categories are
//! cached using `moka` (5-minute TTL); product loads are deliberately
//! uncached so every invocation is exactly one remote fetch and
//! pull-to-refresh always observes the live catalog.

mod types;

pub use types::{Product, RegisteredUser};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::AppConfig;

use types::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Category cache TTL.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Errors that can occur when calling the remote services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("(no detail)"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, when present.
        message: Option<String>,
    },
}

impl ApiError {
    /// Whether this is a rejection the server produced on purpose (4xx), as
    /// opposed to a transport failure or server fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }

    /// Server-provided message, when one was present in the response body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the catalog and auth endpoints.
///
/// Cheaply cloneable; all clones share the underlying HTTP client and
/// category cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    catalog_base: String,
    auth_base: String,
    categories: Cache<String, Vec<String>>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let categories = Cache::builder()
            .max_capacity(8)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                catalog_base: config.catalog_base_url.clone(),
                auth_base: config.auth_base_url.clone(),
                categories,
            }),
        })
    }

    /// Fetch the full product catalog.
    ///
    /// Exactly one remote fetch per invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a
    /// product list.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = format!("{}/products", self.inner.catalog_base);
        let products: Vec<Product> = self.get_json(&url).await?;
        debug!(count = products.len(), "fetched product catalog");
        Ok(products)
    }

    /// Fetch the category list.
    ///
    /// Cached for 5 minutes; the category set is near-static.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a string
    /// list.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<String>, ApiError> {
        let cache_key = "categories".to_owned();

        if let Some(categories) = self.inner.categories.get(&cache_key).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let url = format!("{}/products/categories", self.inner.catalog_base);
        let categories: Vec<String> = self.get_json(&url).await?;

        self.inner
            .categories
            .insert(cache_key, categories.clone())
            .await;

        Ok(categories)
    }

    /// Log in with username and password.
    ///
    /// Returns the opaque session token on success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] when the server rejects the credentials
    /// (with the server's message when it sent one), or a transport/parse
    /// error otherwise.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<SecretString, ApiError> {
        let url = format!("{}/auth/login", self.inner.auth_base);
        let response: LoginResponse = self
            .post_json(&url, &LoginRequest { username, password })
            .await?;
        Ok(SecretString::from(response.access_token))
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] when the server rejects the registration,
    /// or a transport/parse error otherwise.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, ApiError> {
        let url = format!("{}/users/add", self.inner.auth_base);
        let response: RegisterResponse = self
            .post_json(
                &url,
                &RegisterRequest {
                    username,
                    password,
                    email,
                },
            )
            .await?;
        Ok(RegisteredUser { id: response.id })
    }

    // =========================================================================
    // Request Plumbing
    // =========================================================================

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        Self::read_json(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    /// Read a response body, mapping non-success statuses to
    /// [`ApiError::Status`] with the server's `message` field when present.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message);
            tracing::debug!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "request rejected"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "failed to parse response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }
}
