//! Cache types for product reads.

use neobazaar_core::{Product, ProductId};

/// Cache key for product reads.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    AllProducts,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}
