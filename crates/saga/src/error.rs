//! Saga error types.

use domain::DomainError;
use product::ProductError;
use thiserror::Error;

/// Errors that can occur during saga execution.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Step A (persist the order) failed. Nothing external happened, so no
    /// compensation was attempted.
    #[error("order step failed: {0}")]
    OrderStep(#[from] DomainError),

    /// Step B (decrease stock) failed and compensation completed. The
    /// original failure is carried here.
    #[error("stock step failed: {0}")]
    StockStep(#[from] ProductError),

    /// Compensation itself failed after a Step B failure. The order and
    /// stock are now inconsistent; this must reach operators, not be
    /// retried by the coordinator.
    #[error("compensation failed for order {order_no}: {reason} (after stock step failure: {cause})")]
    CompensationFailed {
        order_no: String,
        reason: String,
        cause: String,
    },

    /// The saga task was aborted before reporting an outcome.
    #[error("saga execution aborted: {0}")]
    Aborted(String),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
