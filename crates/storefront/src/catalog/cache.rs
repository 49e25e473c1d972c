//! Cache types for catalog reads.

use bazaar_core::{Category, CategoryFilter, Product};

/// Cache key for categories and product listings.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories { active_only: bool },
    Products(CategoryFilter),
}

impl CacheKey {
    /// Whether this entry must be dropped after a product write.
    pub const fn is_product_listing(&self) -> bool {
        matches!(self, Self::Products(_))
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
}
