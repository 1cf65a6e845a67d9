//! Compensating-transaction (saga) coordination for order creation.
//!
//! Creating an order spans two independently-owned services: the order
//! record is persisted first, then product stock is decremented. There is
//! no distributed lock or two-phase commit; instead the coordinator drives
//! an explicit state machine with a named compensation edge:
//!
//! ```text
//! Init ──► OrderCreated ──┬──► Committed
//!                         └──► Compensating ──┬──► RolledBack
//!                                             └──► CompensationFailed
//! ```
//!
//! Step A failing needs no compensation (nothing external happened yet).
//! Step B failing reverts the stock decrement and deletes the order record,
//! both idempotent per order number. A failing revert is the one fatal
//! outcome: it is surfaced distinctly and left to operational
//! reconciliation, never auto-retried.

pub mod coordinator;
pub mod error;
pub mod state;

pub use coordinator::{CreateOrderSaga, OrderSagaCoordinator, RevertOrder};
pub use error::SagaError;
pub use state::SagaState;
