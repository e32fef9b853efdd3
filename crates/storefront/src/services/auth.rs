//! Authentication flows.
//!
//! Validates credentials locally, talks to the auth endpoints, and drives
//! the session gate. Registration chains straight into login on success,
//! matching the account-creation flow of the storefront.

use doorstep_core::{Email, EmailError};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::session::{SessionGate, StoreError};

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password missing at login.
    #[error("username and password are required")]
    MissingCredentials,

    /// A registration field is missing.
    #[error("all fields are required")]
    MissingFields,

    /// Email failed validation at registration.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too short at registration.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Required minimum length.
        min: usize,
    },

    /// The server rejected the credentials or registration.
    #[error("{}", .message.as_deref().unwrap_or("invalid credentials"))]
    Rejected {
        /// Server-provided message, when one was sent.
        message: Option<String>,
    },

    /// The request never produced a server verdict.
    #[error("network error: {0}")]
    Api(#[from] ApiError),

    /// The issued token could not be persisted.
    #[error("token storage failed: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Account created and the follow-up login succeeded.
    LoggedIn,
    /// Account created but the follow-up login failed; the user should log
    /// in manually with the new credentials.
    RegisteredNeedsLogin,
}

/// Authentication service.
///
/// Owns the login and registration call chains and the logout transition.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    gate: SessionGate,
}

impl AuthService {
    /// Create an authentication service.
    #[must_use]
    pub const fn new(api: ApiClient, gate: SessionGate) -> Self {
        Self { api, gate }
    }

    /// Log in with username and password.
    ///
    /// Inputs are trimmed before submission. On success the issued token is
    /// persisted and the session becomes authenticated.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` when either field is blank, `Rejected`
    /// (with the server's message when available) when the server refuses
    /// the credentials, and `Api`/`Store` errors otherwise.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let token = self
            .api
            .login(username, password)
            .await
            .map_err(reject_on_client_error)?;

        self.gate.establish(token).await?;
        info!("login succeeded");
        Ok(())
    }

    /// Register a new account, then log in with the new credentials.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a field is missing or malformed, and
    /// `Rejected`/`Api` errors when the registration call fails. A failure
    /// in the follow-up login is not an error; it yields
    /// [`RegisterOutcome::RegisteredNeedsLogin`].
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        let username = username.trim();
        if username.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(email.trim())?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        self.api
            .register(username, email.as_str(), password)
            .await
            .map_err(reject_on_client_error)?;

        // Chain straight into login so the new account lands in the
        // authenticated flow without re-typing credentials.
        match self.login(username, password).await {
            Ok(()) => Ok(RegisterOutcome::LoggedIn),
            Err(e) => {
                warn!(error = %e, "post-registration login failed");
                Ok(RegisterOutcome::RegisteredNeedsLogin)
            }
        }
    }

    /// Log out: clear the persisted token and drop to unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the token cannot be removed.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.gate.clear_session().await?;
        info!("logged out");
        Ok(())
    }
}

/// Map deliberate server rejections (4xx) to [`AuthError::Rejected`] so the
/// server's own message reaches the user; everything else stays a fetch
/// error.
fn reject_on_client_error(error: ApiError) -> AuthError {
    if error.is_rejection() {
        AuthError::Rejected {
            message: error.server_message().map(str::to_owned),
        }
    } else {
        AuthError::Api(error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_server_message() {
        let err = AuthError::Rejected {
            message: Some("Invalid credentials".to_owned()),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_rejected_falls_back_to_generic_message() {
        let err = AuthError::Rejected { message: None };
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_client_error_maps_to_rejected() {
        let err = reject_on_client_error(ApiError::Status {
            status: 400,
            message: Some("nope".to_owned()),
        });
        assert!(matches!(err, AuthError::Rejected { message: Some(m) } if m == "nope"));
    }

    #[test]
    fn test_server_fault_stays_api_error() {
        let err = reject_on_client_error(ApiError::Status {
            status: 503,
            message: None,
        });
        assert!(matches!(err, AuthError::Api(_)));
    }
}
