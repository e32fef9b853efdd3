//! Core types for Doorstep.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod condition;
pub mod email;
pub mod id;
pub mod rating;

pub use condition::Condition;
pub use email::{Email, EmailError};
pub use id::*;
pub use rating::{Rating, RatingError};
