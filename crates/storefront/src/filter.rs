//! Catalog filtering.
//!
//! A [`FilterCriteria`] is a pure predicate over products: category
//! exact-match (when set) AND an inclusive price window. Filtering always
//! recomputes the full view from the full catalog; nothing here retains
//! state between calls.

use rust_decimal::Decimal;

use crate::api::Product;

/// Filter criteria for the catalog view.
///
/// An unset or empty category means "all categories". An inverted price
/// window (`min_price > max_price`) is tolerated and simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// Exact category to keep, or `None` for all.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Decimal,
    /// Inclusive upper price bound.
    pub max_price: Decimal,
}

impl FilterCriteria {
    /// Criteria over a price window with no category exclusion.
    #[must_use]
    pub const fn price_window(min_price: Decimal, max_price: Decimal) -> Self {
        Self {
            category: None,
            min_price,
            max_price,
        }
    }

    /// Whether a single product satisfies both predicates.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .is_none_or(|category| product.category == category);

        category_ok && product.price >= self.min_price && product.price <= self.max_price
    }

    /// Filter a catalog, preserving relative order.
    ///
    /// The result is always a subsequence of `catalog`; an empty catalog or
    /// an inverted price window yields an empty result, never an error.
    #[must_use]
    pub fn apply(&self, catalog: &[Product]) -> Vec<Product> {
        catalog
            .iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect()
    }
}
