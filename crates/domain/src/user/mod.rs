//! User entity and session-bound operations.

mod memory;
mod model;
mod postgres;
mod repository;
mod service;

pub use memory::InMemoryUserRepository;
pub use model::{User, UserDetail};
pub use postgres::PostgresUserRepository;
pub use repository::UserRepository;
pub use service::{LoginResult, UserService};

use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// The username is already taken.
    #[error("username already exists: {username}")]
    UsernameExists { username: String },

    /// The username/password pair did not match.
    #[error("account or password incorrect")]
    InvalidCredentials,

    /// No user exists with the given ID.
    #[error("user not found")]
    NotFound,
}
