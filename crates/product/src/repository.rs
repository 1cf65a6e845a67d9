//! Product catalog persistence contract.

use async_trait::async_trait;
use common::ProductId;

use crate::error::ProductError;
use crate::model::{NewProduct, Product};

/// CRUD persistence for products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product and assigns its ID.
    async fn create(&self, new: NewProduct) -> Result<Product, ProductError>;

    /// Replaces the stored product with the given one.
    async fn update(&self, product: Product) -> Result<Product, ProductError>;

    /// Removes a product. Deleting an unknown product is an error.
    async fn delete(&self, id: ProductId) -> Result<(), ProductError>;

    /// Loads a product by ID.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, ProductError>;

    /// Lists all products.
    async fn list(&self) -> Result<Vec<Product>, ProductError>;
}
