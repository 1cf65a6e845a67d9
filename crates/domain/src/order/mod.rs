//! Order entity and related types.

mod memory;
mod model;
mod postgres;
mod repository;
mod service;
mod state;

pub use memory::InMemoryOrderRepository;
pub use model::{NewOrder, Order, PaymentType};
pub use postgres::PostgresOrderRepository;
pub use repository::OrderRepository;
pub use service::{CreateOrder, OrderService, UpdateOrder};
pub use state::OrderStatus;

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order exists with the given order number.
    #[error("order not found: {order_no}")]
    NotFound { order_no: String },

    /// An order with the same order number already exists.
    #[error("duplicate order number: {order_no}")]
    DuplicateOrderNo { order_no: String },

    /// Order is not in the expected status.
    #[error("invalid status transition: cannot {action} from {current} status")]
    InvalidStatusTransition {
        current: OrderStatus,
        action: &'static str,
    },
}
