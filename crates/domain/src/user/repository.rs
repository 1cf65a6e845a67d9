//! User persistence contract.

use async_trait::async_trait;
use common::UserId;

use super::model::User;
use crate::error::DomainError;

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user.
    ///
    /// Fails with [`super::UserError::UsernameExists`] if the username is
    /// taken.
    async fn insert(&self, user: User) -> Result<User, DomainError>;

    /// Loads a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Loads a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;
}
