//! User-action services.
//!
//! Each service wraps one user-triggered flow: credential handling in
//! [`auth`], delivery confirmation in [`proof`]. Services catch remote and
//! storage failures at the action boundary and report them as typed errors
//! the shell can turn into notices.

pub mod auth;
pub mod proof;

pub use auth::{AuthError, AuthService, RegisterOutcome};
pub use proof::{
    Camera, CaptureError, DeliverySink, PodForm, ProofOfDelivery, SimulatedSink, SubmitError,
    ValidationError,
};
