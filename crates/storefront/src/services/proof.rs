//! Proof-of-delivery flow.
//!
//! The recipient photographs the delivered item, rates it, records its
//! condition, and optionally leaves feedback. Submission is validated
//! locally (photo and rating are mandatory) before the record goes to the
//! delivery sink. The camera and the sink are external capabilities behind
//! traits; a permission denial blocks only the capture action.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use doorstep_core::{Condition, Rating};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

/// Default simulated submission delay.
const SIMULATED_DELAY: Duration = Duration::from_millis(1500);

/// Errors from photo capture.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    /// The platform denied the camera/storage permission.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The camera could not be launched or failed mid-capture.
    #[error("camera failed: {0}")]
    Failed(String),
}

/// Errors from submitting a proof of delivery.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form is incomplete.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The sink refused or lost the record.
    #[error("submission failed: {0}")]
    Sink(String),
}

/// Local validation failures, surfaced immediately and recoverable by
/// re-input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// No photo captured yet.
    #[error("please take a photo of the delivered item")]
    MissingPhoto,
    /// No star selected yet.
    #[error("please rate the delivered item")]
    MissingRating,
}

/// External photo-capture capability.
///
/// Permission must be granted before the camera launches; implementations
/// surface a denial as [`CaptureError::PermissionDenied`].
#[async_trait]
pub trait Camera: Send + Sync {
    /// Request whatever platform permission the capture needs.
    async fn ensure_permission(&self) -> Result<(), CaptureError>;

    /// Launch the camera and return the captured image URI.
    async fn capture(&self) -> Result<String, CaptureError>;
}

/// Destination for submitted proof-of-delivery records.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Deliver one record.
    async fn deliver(&self, record: &ProofOfDelivery) -> Result<(), SubmitError>;
}

/// A completed proof-of-delivery record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOfDelivery {
    /// URI of the captured photo.
    pub image_uri: String,
    /// Star rating, 1-5.
    pub rating: Rating,
    /// Condition of the delivered item.
    pub condition: Condition,
    /// Free-form feedback, possibly empty.
    pub feedback: String,
    /// Submission timestamp (ISO-8601).
    pub submitted_at: DateTime<Utc>,
}

// =============================================================================
// Form state
// =============================================================================

/// In-progress proof-of-delivery form.
///
/// Holds the screen's state between user actions; [`submit`](Self::submit)
/// validates, delivers, and resets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodForm {
    image_uri: Option<String>,
    rating: u8,
    condition: Condition,
    feedback: String,
}

impl PodForm {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture (or retake) the photo.
    ///
    /// # Errors
    ///
    /// Propagates permission denial or camera failure; the rest of the form
    /// is unaffected either way.
    pub async fn take_photo(&mut self, camera: &dyn Camera) -> Result<&str, CaptureError> {
        camera.ensure_permission().await?;
        let uri = camera.capture().await?;
        self.image_uri = Some(uri);
        Ok(self.image_uri.as_deref().unwrap_or_default())
    }

    /// Select a star rating. Zero means "unset"; values above five clamp.
    pub const fn set_rating(&mut self, stars: u8) {
        self.rating = if stars > Rating::MAX { Rating::MAX } else { stars };
    }

    /// Select the item condition.
    pub const fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
    }

    /// Replace the feedback text.
    pub fn set_feedback(&mut self, feedback: impl Into<String>) {
        self.feedback = feedback.into();
    }

    /// The captured photo URI, if any.
    #[must_use]
    pub fn image_uri(&self) -> Option<&str> {
        self.image_uri.as_deref()
    }

    /// The selected rating (0 = unset).
    #[must_use]
    pub const fn rating(&self) -> u8 {
        self.rating
    }

    /// The selected condition.
    #[must_use]
    pub const fn condition(&self) -> Condition {
        self.condition
    }

    /// The feedback text.
    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Check that the form is submittable: photo present, rating selected.
    ///
    /// # Errors
    ///
    /// Returns the first missing requirement.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.image_uri.is_none() {
            return Err(ValidationError::MissingPhoto);
        }
        if self.rating < Rating::MIN {
            return Err(ValidationError::MissingRating);
        }
        Ok(())
    }

    /// Validate, deliver, and reset the form.
    ///
    /// Returns the submitted record. On any error the form keeps its state
    /// so the user can fix and retry.
    ///
    /// # Errors
    ///
    /// Validation failures and sink failures.
    #[instrument(skip(self, sink))]
    pub async fn submit(&mut self, sink: &dyn DeliverySink) -> Result<ProofOfDelivery, SubmitError> {
        self.validate()?;

        let record = ProofOfDelivery {
            image_uri: self.image_uri.clone().unwrap_or_default(),
            rating: Rating::clamped(self.rating),
            condition: self.condition,
            feedback: self.feedback.clone(),
            submitted_at: Utc::now(),
        };

        sink.deliver(&record).await?;

        *self = Self::default();
        Ok(record)
    }
}

// =============================================================================
// Simulated sink
// =============================================================================

/// Sink that simulates a remote submission: waits, then logs the payload.
#[derive(Debug, Clone)]
pub struct SimulatedSink {
    delay: Duration,
}

impl SimulatedSink {
    /// Sink with a custom delay (tests use zero).
    #[must_use]
    pub const fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSink {
    fn default() -> Self {
        Self::with_delay(SIMULATED_DELAY)
    }
}

#[async_trait]
impl DeliverySink for SimulatedSink {
    async fn deliver(&self, record: &ProofOfDelivery) -> Result<(), SubmitError> {
        tokio::time::sleep(self.delay).await;
        info!(
            rating = %record.rating,
            condition = %record.condition,
            submitted_at = %record.submitted_at,
            "proof of delivery submitted"
        );
        Ok(())
    }
}
