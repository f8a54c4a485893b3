//! Cache types for public catalog responses.

use std::sync::Arc;

use bazaar_core::{Category, Product};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// The full public category list.
    Categories,
    /// Home page featured products.
    FeaturedProducts,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Products(Arc<Vec<Product>>),
}
