//! Doorstep Core - Shared types library.
//!
//! This crate provides common types used across all Doorstep components:
//! - `storefront` - The storefront client core (catalog, cart, session)
//! - `integration-tests` - End-to-end flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, ratings, and
//!   delivery conditions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
