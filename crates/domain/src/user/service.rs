//! User service: registration and session-bound operations.

use std::sync::Arc;

use auth::{AuthError, AuthService};
use chrono::Utc;
use common::UserId;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::UserError;
use super::model::{User, UserDetail};
use super::repository::UserRepository;
use crate::error::DomainError;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expire_in: i64,
}

/// Service for managing users and their sessions.
///
/// Token lifecycle stays with the auth service; this service only holds a
/// handle to it for issuing and revoking on login/logout.
pub struct UserService<R: UserRepository> {
    repo: R,
    auth: Arc<AuthService>,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a new user service.
    pub fn new(repo: R, auth: Arc<AuthService>) -> Self {
        Self { repo, auth }
    }

    /// Registers a new user.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        if self.repo.find_by_username(username).await?.is_some() {
            return Err(UserError::UsernameExists {
                username: username.to_string(),
            }
            .into());
        }

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password_hash: digest_password(password),
            created_at: Utc::now(),
        };
        self.repo.insert(user).await
    }

    /// Verifies credentials and issues an access token.
    ///
    /// A wrong username and a wrong password are indistinguishable to the
    /// caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, DomainError> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if user.password_hash != digest_password(password) {
            return Err(UserError::InvalidCredentials.into());
        }

        let token = self.auth.issue_token(user.id).await?;
        metrics::counter!("user_logins_total").increment(1);

        Ok(LoginResult {
            access_token: token.value,
            expire_in: self.auth.token_ttl_secs(),
        })
    }

    /// Revokes the session token (idempotent).
    #[tracing::instrument(skip(self, access_token))]
    pub async fn logout(&self, access_token: &str) -> Result<(), DomainError> {
        self.auth.revoke_token(access_token).await?;
        Ok(())
    }

    /// Resolves the session token to the caller's user detail.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn info(&self, access_token: &str) -> Result<UserDetail, DomainError> {
        let user_id = self
            .auth
            .identity(access_token)
            .await?
            .ok_or(AuthError::Denied)?;

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }
}

/// Hex-encoded SHA-256 digest of a password.
fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
