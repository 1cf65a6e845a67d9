//! Stock mutation contract consumed by the order saga.

use async_trait::async_trait;
use common::{OrderNo, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::ProductError;

/// A stock decrement (or its reversal) tied to one order.
///
/// The order number is the idempotency key: it decides whether the
/// decrement has already been applied or reverted, independent of how many
/// times the request is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub order_no: OrderNo,
}

impl StockRequest {
    /// Creates a stock request.
    pub fn new(product_id: ProductId, quantity: u32, order_no: OrderNo) -> Self {
        Self {
            product_id,
            quantity,
            order_no,
        }
    }
}

/// Forward and compensating stock actions.
///
/// Both actions must be safe to invoke more than once with the same order
/// number without double-decrementing or double-crediting.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Decrements stock for the request's product, keyed by order number.
    ///
    /// A replay for an already-applied order number succeeds without
    /// touching stock. Insufficient stock is a conflict and mutates nothing.
    async fn decrease_stock(&self, req: StockRequest) -> Result<(), ProductError>;

    /// Restores exactly the amount the order number previously decremented.
    ///
    /// A replay for an already-reverted order number, or a revert for an
    /// order number that never applied, succeeds without touching stock.
    async fn decrease_stock_revert(&self, req: StockRequest) -> Result<(), ProductError>;
}
