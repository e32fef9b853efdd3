//! Unified error handling with Sentry integration.
//!
//! Every user-triggered action returns `Result<T, AppError>`; at the action
//! boundary the shell converts the error into a [`Notice`] for display.
//! Fetch and storage failures are captured to Sentry before conversion.
//! Nothing here propagates as an unhandled fault that would crash the
//! session.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::proof::{CaptureError, SubmitError};
use crate::session::StoreError;

/// Application-level error type for the storefront core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote fetch failed (catalog, categories).
    #[error("Fetch error: {0}")]
    Fetch(#[from] ApiError),

    /// Authentication flow failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Photo capture failed or was not permitted.
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Proof-of-delivery submission failed.
    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    /// Token storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Kind of a user-visible notice, for the shell to pick icon/severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Recoverable input problem; fix and retry.
    Validation,
    /// A remote call failed; previous state was kept.
    Fetch,
    /// A platform permission was denied; only that action is blocked.
    Permission,
    /// Credentials were rejected.
    Auth,
    /// Anything else.
    Internal,
}

/// A user-visible notice derived from an error at the action boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// What kind of problem this is.
    pub kind: NoticeKind,
    /// Message safe to show the user.
    pub message: String,
}

impl AppError {
    /// Convert into a user-visible notice, capturing unexpected failures to
    /// Sentry first.
    #[must_use]
    pub fn into_notice(self) -> Notice {
        if matches!(
            self,
            Self::Fetch(_) | Self::Store(_) | Self::Auth(AuthError::Api(_) | AuthError::Store(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Action error"
            );
        }

        let kind = match &self {
            Self::Fetch(_) | Self::Auth(AuthError::Api(_)) => NoticeKind::Fetch,
            Self::Auth(AuthError::Rejected { .. }) => NoticeKind::Auth,
            Self::Auth(AuthError::Store(_)) => NoticeKind::Internal,
            Self::Auth(_) => NoticeKind::Validation,
            Self::Capture(CaptureError::PermissionDenied) => NoticeKind::Permission,
            Self::Capture(CaptureError::Failed(_)) => NoticeKind::Internal,
            Self::Submit(SubmitError::Validation(_)) => NoticeKind::Validation,
            Self::Submit(SubmitError::Sink(_)) | Self::Store(_) | Self::Config(_) => {
                NoticeKind::Internal
            }
        };

        let message = match &self {
            // Don't expose transport details to the user.
            Self::Fetch(_) | Self::Auth(AuthError::Api(_)) => {
                "Could not reach the store. Please try again.".to_owned()
            }
            Self::Store(_) | Self::Auth(AuthError::Store(_)) => {
                "Something went wrong. Please try again.".to_owned()
            }
            Self::Auth(err) => err.to_string(),
            Self::Capture(err) => err.to_string(),
            Self::Submit(err) => err.to_string(),
            Self::Config(err) => err.to_string(),
        };

        Notice { kind, message }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_becomes_fetch_notice() {
        let err = AppError::Fetch(ApiError::Status {
            status: 502,
            message: None,
        });
        let notice = err.into_notice();
        assert_eq!(notice.kind, NoticeKind::Fetch);
        assert_eq!(notice.message, "Could not reach the store. Please try again.");
    }

    #[test]
    fn test_rejected_credentials_become_auth_notice_with_server_message() {
        let err = AppError::Auth(AuthError::Rejected {
            message: Some("Invalid credentials".to_owned()),
        });
        let notice = err.into_notice();
        assert_eq!(notice.kind, NoticeKind::Auth);
        assert_eq!(notice.message, "Invalid credentials");
    }

    #[test]
    fn test_missing_credentials_become_validation_notice() {
        let notice = AppError::Auth(AuthError::MissingCredentials).into_notice();
        assert_eq!(notice.kind, NoticeKind::Validation);
        assert_eq!(notice.message, "username and password are required");
    }

    #[test]
    fn test_permission_denied_becomes_permission_notice() {
        let notice = AppError::Capture(CaptureError::PermissionDenied).into_notice();
        assert_eq!(notice.kind, NoticeKind::Permission);
    }

    #[test]
    fn test_submit_validation_becomes_validation_notice() {
        use crate::services::proof::ValidationError;

        let notice =
            AppError::Submit(SubmitError::Validation(ValidationError::MissingPhoto)).into_notice();
        assert_eq!(notice.kind, NoticeKind::Validation);
        assert_eq!(notice.message, "please take a photo of the delivered item");
    }
}
