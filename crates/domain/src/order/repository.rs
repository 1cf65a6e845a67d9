//! Order persistence contract.

use async_trait::async_trait;
use common::OrderNo;

use super::model::{NewOrder, Order};
use super::state::OrderStatus;
use crate::error::DomainError;

/// CRUD persistence for orders, keyed by the order number business key.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts an order and assigns its row ID.
    ///
    /// Fails with [`super::OrderError::DuplicateOrderNo`] if the order
    /// number is already taken.
    async fn insert(&self, new: NewOrder) -> Result<Order, DomainError>;

    /// Replaces the stored order with the given one.
    async fn update(&self, order: Order) -> Result<Order, DomainError>;

    /// Sets the status of an order.
    async fn set_status(&self, order_no: &OrderNo, status: OrderStatus)
    -> Result<Order, DomainError>;

    /// Loads an order by its order number.
    async fn find_by_order_no(&self, order_no: &OrderNo) -> Result<Option<Order>, DomainError>;

    /// Lists all orders.
    async fn list(&self) -> Result<Vec<Order>, DomainError>;
}
