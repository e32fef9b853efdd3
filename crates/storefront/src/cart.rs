//! In-memory cart ledger.
//!
//! The authoritative record of what the user intends to purchase. Lines are
//! denormalized snapshots taken at add-time, so catalog refreshes never
//! mutate cart contents. All operations are synchronous, infallible, and
//! keep the insertion order of lines.

use doorstep_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::Product;

/// A single cart line: one product with a quantity.
///
/// Invariant: `quantity >= 1`. A line whose quantity would drop to zero is
/// removed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Title snapshot taken when the line was created.
    pub title: String,
    /// Price snapshot taken when the line was created.
    pub price: Decimal,
    /// Image URI snapshot taken when the line was created.
    pub image: String,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Line subtotal (`price * quantity`).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The cart ledger: at most one line per product, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line's quantity, or appends a new line with
    /// quantity 1 and a snapshot of the product's title, price, and image.
    /// Never fails; repeated calls accumulate quantity predictably.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity += 1;
            return;
        }

        self.lines.push(CartLine {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        });
    }

    /// Remove a line entirely. No-op if the product is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Set a line's quantity.
    ///
    /// Quantities below 1 are clamped to 1; a zero or negative quantity can
    /// never persist. No-op if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity.max(1);
        }
    }

    /// Sum of `price * quantity` over all lines.
    ///
    /// Computed freshly on every call; an empty cart totals zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Number of distinct lines (the cart badge number), not total quantity.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// All lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a product, if it is in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}
