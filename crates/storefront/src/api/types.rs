//! Wire types for the catalog and auth endpoints.
//!
//! These types mirror the JSON the remote services return. Anything the rest
//! of the crate consumes is re-exported through [`crate::api`]; raw response
//! envelopes stay private to the client.

use doorstep_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable product from the remote catalog.
///
/// Immutable once fetched; the catalog store owns the canonical list and the
/// cart takes denormalized snapshots, so a catalog refresh never mutates
/// existing cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Externally assigned unique id.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image URI.
    pub image: String,
    /// Category name (exact-match filterable).
    pub category: String,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login response.
///
/// The canonical token field is `accessToken`; `token` is accepted as an
/// alias because both spellings exist in the wild for this endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: String,
}

/// Registration request body.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

/// Successful registration response.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    pub id: i64,
}

/// A newly registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    /// Server-assigned account id.
    pub id: i64,
}

/// Error envelope most endpoints use for rejections.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: Option<String>,
}
