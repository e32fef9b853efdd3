//! Catalog store.
//!
//! Owns the fetched product list, the category list, the derived price
//! bounds, and the user's selected filter window. The filtered view is
//! recomputed from scratch on every read through [`FilterCriteria`].
//!
//! Loads are generation-counted: a fetch that resolves after the store was
//! reset (screen unmounted) is discarded instead of being applied to a
//! now-irrelevant store.

use rust_decimal::Decimal;
use tracing::debug;

use crate::api::Product;
use crate::filter::FilterCriteria;

/// Whole-unit price bounds derived from the catalog.
///
/// `min` is the floor of the cheapest price and `max` the ceiling of the
/// most expensive one, matching what a step-1 range slider needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceBounds {
    /// Floor of the minimum catalog price.
    pub min: Decimal,
    /// Ceiling of the maximum catalog price.
    pub max: Decimal,
}

impl PriceBounds {
    fn derive(products: &[Product]) -> Self {
        let mut prices = products.iter().map(|product| product.price);
        let Some(first) = prices.next() else {
            return Self::default();
        };

        let (min, max) = prices.fold((first, first), |(min, max), price| {
            (min.min(price), max.max(price))
        });

        Self {
            min: min.floor(),
            max: max.ceil(),
        }
    }

    fn clamp(&self, value: Decimal) -> Decimal {
        value.clamp(self.min, self.max)
    }
}

/// Token tying an in-flight load to the store generation it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// The selected price window (slider state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PriceWindow {
    min: Decimal,
    max: Decimal,
}

/// Store for the fetched catalog and its derived filtered view.
#[derive(Debug, Default)]
pub struct CatalogStore {
    products: Vec<Product>,
    categories: Vec<String>,
    bounds: PriceBounds,
    category: Option<String>,
    window: Option<PriceWindow>,
    generation: u64,
}

impl CatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a load against the current store generation.
    ///
    /// Pass the returned token to [`commit_products`](Self::commit_products)
    /// or [`commit_categories`](Self::commit_categories) when the fetch
    /// resolves. Product and category fetches started from the same mount
    /// share a generation; [`reset`](Self::reset) invalidates both.
    #[must_use]
    pub const fn begin_load(&self) -> LoadToken {
        LoadToken(self.generation)
    }

    /// Apply a finished product fetch.
    ///
    /// Replaces the catalog, re-derives the price bounds, and clamps the
    /// selected price window into the new bounds (a first load selects the
    /// full bounds). Returns whether the commit landed; a stale token leaves
    /// the store untouched.
    pub fn commit_products(&mut self, token: LoadToken, products: Vec<Product>) -> bool {
        if token.0 != self.generation {
            debug!("discarding stale product load");
            return false;
        }

        self.products = products;
        self.bounds = PriceBounds::derive(&self.products);
        self.window = Some(match self.window {
            None => PriceWindow {
                min: self.bounds.min,
                max: self.bounds.max,
            },
            Some(window) => PriceWindow {
                min: self.bounds.clamp(window.min),
                max: self.bounds.clamp(window.max),
            },
        });
        true
    }

    /// Apply a finished category fetch. Returns whether the commit landed.
    pub fn commit_categories(&mut self, token: LoadToken, categories: Vec<String>) -> bool {
        if token.0 != self.generation {
            debug!("discarding stale category load");
            return false;
        }

        self.categories = categories;
        true
    }

    /// Drop all fetched state and invalidate in-flight loads.
    ///
    /// Called when the owning screen unmounts; any load still in flight will
    /// fail its commit.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.products.clear();
        self.categories.clear();
        self.bounds = PriceBounds::default();
        self.category = None;
        self.window = None;
    }

    /// Select a category filter. An empty string selects all categories.
    pub fn set_category(&mut self, category: &str) {
        self.category = if category.is_empty() {
            None
        } else {
            Some(category.to_owned())
        };
    }

    /// Select a price window from the slider.
    ///
    /// Stored as given; the slider keeps the ends ordered, and the filter
    /// tolerates an inverted window by matching nothing.
    pub fn set_price_range(&mut self, min: Decimal, max: Decimal) {
        self.window = Some(PriceWindow { min, max });
    }

    /// The active filter criteria.
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        let (min_price, max_price) = self.window.map_or_else(
            || (self.bounds.min, self.bounds.max),
            |window| (window.min, window.max),
        );
        FilterCriteria {
            category: self.category.clone(),
            min_price,
            max_price,
        }
    }

    /// The filtered view, recomputed in full from the current catalog.
    #[must_use]
    pub fn filtered(&self) -> Vec<Product> {
        self.criteria().apply(&self.products)
    }

    /// The full fetched catalog.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The fetched category list.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The derived price bounds.
    #[must_use]
    pub const fn bounds(&self) -> PriceBounds {
        self.bounds
    }
}
