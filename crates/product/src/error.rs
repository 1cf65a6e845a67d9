//! Product service error types.

use common::ProductId;
use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// No product exists with the given ID.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Not enough stock to satisfy a decrement.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product service (or its store) could not be reached.
    #[error("product service unavailable: {0}")]
    Unavailable(String),

    /// Database error.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Convenience type alias for product results.
pub type Result<T> = std::result::Result<T, ProductError>;
