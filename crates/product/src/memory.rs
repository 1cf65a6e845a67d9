//! In-memory product store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderNo, ProductId};

use crate::error::ProductError;
use crate::model::{NewProduct, Product};
use crate::repository::ProductRepository;
use crate::stock::{StockRequest, StockService};

#[derive(Debug, Default)]
struct InMemoryProductState {
    products: HashMap<ProductId, Product>,
    /// Decrements applied, keyed by order number.
    applied: HashMap<OrderNo, (ProductId, u32)>,
    /// Order numbers whose decrement has been credited back.
    reverted: HashSet<OrderNo>,
    next_id: i64,
    fail_on_decrease: bool,
    fail_on_revert: bool,
}

/// In-memory product store.
///
/// Backs the default wiring and tests; implements both the catalog
/// repository and the stock service, with fault switches to simulate the
/// remote service being unreachable.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    state: Arc<RwLock<InMemoryProductState>>,
}

impl InMemoryProductStore {
    /// Creates a new empty product store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures stock decrements to fail as unreachable.
    pub fn set_fail_on_decrease(&self, fail: bool) {
        self.state.write().unwrap().fail_on_decrease = fail;
    }

    /// Configures stock reverts to fail as unreachable.
    pub fn set_fail_on_revert(&self, fail: bool) {
        self.state.write().unwrap().fail_on_revert = fail;
    }

    /// Returns the stock level of a product, if it exists.
    pub fn stock_of(&self, id: ProductId) -> Option<u32> {
        self.state.read().unwrap().products.get(&id).map(|p| p.stock)
    }

    /// Returns true if the order number holds an applied, unreverted
    /// decrement.
    pub fn has_applied_decrement(&self, order_no: &OrderNo) -> bool {
        let state = self.state.read().unwrap();
        state.applied.contains_key(order_no) && !state.reverted.contains(order_no)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn create(&self, new: NewProduct) -> Result<Product, ProductError> {
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let product = Product {
            id: ProductId::new(state.next_id),
            name: new.name,
            price: new.price,
            stock: new.stock,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product, ProductError> {
        let mut state = self.state.write().unwrap();
        if !state.products.contains_key(&product.id) {
            return Err(ProductError::NotFound(product.id));
        }
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), ProductError> {
        let mut state = self.state.write().unwrap();
        state
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(ProductError::NotFound(id))
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, ProductError> {
        Ok(self.state.read().unwrap().products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, ProductError> {
        let mut products: Vec<Product> =
            self.state.read().unwrap().products.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

#[async_trait]
impl StockService for InMemoryProductStore {
    #[tracing::instrument(skip(self))]
    async fn decrease_stock(&self, req: StockRequest) -> Result<(), ProductError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_decrease {
            return Err(ProductError::Unavailable(
                "stock service unreachable".to_string(),
            ));
        }

        // Replay of an already-applied decrement.
        if state.applied.contains_key(&req.order_no) {
            return Ok(());
        }

        let product = state
            .products
            .get_mut(&req.product_id)
            .ok_or(ProductError::NotFound(req.product_id))?;

        if product.stock < req.quantity {
            return Err(ProductError::InsufficientStock {
                product_id: req.product_id,
                requested: req.quantity,
                available: product.stock,
            });
        }

        product.stock -= req.quantity;
        state
            .applied
            .insert(req.order_no, (req.product_id, req.quantity));
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn decrease_stock_revert(&self, req: StockRequest) -> Result<(), ProductError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_revert {
            return Err(ProductError::Unavailable(
                "stock service unreachable".to_string(),
            ));
        }

        // Replay of an already-credited revert.
        if state.reverted.contains(&req.order_no) {
            return Ok(());
        }

        // Credit back exactly what this order number decremented; a revert
        // for an order number that never applied is a no-op.
        let Some((product_id, quantity)) = state.applied.get(&req.order_no).copied() else {
            return Ok(());
        };

        if let Some(product) = state.products.get_mut(&product_id) {
            product.stock += quantity;
        }
        state.reverted.insert(req.order_no);
        Ok(())
    }
}
