//! Authorization error types.

use thiserror::Error;

/// Errors that can occur during authorization operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The call was not admitted. Every denial cause collapses to this
    /// variant at the service boundary so callers learn nothing about
    /// internal state.
    #[error("please log in")]
    Denied,

    /// The auth service (or its store) could not be reached. Interceptors
    /// treat this as a denial, never as an admission.
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for auth results.
pub type Result<T> = std::result::Result<T, AuthError>;
