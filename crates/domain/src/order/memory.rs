//! In-memory order repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderNo;
use tokio::sync::RwLock;

use super::OrderError;
use super::model::{NewOrder, Order};
use super::repository::OrderRepository;
use super::state::OrderStatus;
use crate::error::DomainError;

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderNo, Order>,
    next_id: i64,
}

/// In-memory order repository for the default wiring and tests.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders, any status.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, new: NewOrder) -> Result<Order, DomainError> {
        let mut state = self.state.write().await;

        if state.orders.contains_key(&new.order_no) {
            return Err(OrderError::DuplicateOrderNo {
                order_no: new.order_no.to_string(),
            }
            .into());
        }

        state.next_id += 1;
        let order = Order {
            id: state.next_id,
            order_no: new.order_no.clone(),
            user_id: new.user_id,
            product_id: new.product_id,
            amount: new.amount,
            payment_type: new.payment_type,
            status: new.status,
            created_at: Utc::now(),
        };
        state.orders.insert(new.order_no, order.clone());
        Ok(order)
    }

    async fn update(&self, order: Order) -> Result<Order, DomainError> {
        let mut state = self.state.write().await;
        if !state.orders.contains_key(&order.order_no) {
            return Err(OrderError::NotFound {
                order_no: order.order_no.to_string(),
            }
            .into());
        }
        state.orders.insert(order.order_no.clone(), order.clone());
        Ok(order)
    }

    async fn set_status(
        &self,
        order_no: &OrderNo,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .get_mut(order_no)
            .ok_or_else(|| OrderError::NotFound {
                order_no: order_no.to_string(),
            })?;
        order.status = status;
        Ok(order.clone())
    }

    async fn find_by_order_no(&self, order_no: &OrderNo) -> Result<Option<Order>, DomainError> {
        Ok(self.state.read().await.orders.get(order_no).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self.state.read().await.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }
}
