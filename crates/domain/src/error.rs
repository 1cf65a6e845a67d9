//! Domain error types.

use auth::AuthError;
use thiserror::Error;

use crate::order::OrderError;
use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error in the order module.
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    /// An error in the user module.
    #[error("user error: {0}")]
    User(#[from] UserError),

    /// An authorization error while handling a session-bound call.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Database error.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}
