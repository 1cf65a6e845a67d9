//! Access token store contract and in-process implementation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AuthError;

/// Default token lifetime: seven days, also used as the sliding-expiration
/// extension window on every successful validation.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// An issued access token.
///
/// Owned exclusively by the token store; other services reference tokens by
/// value only and never manage their lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque token value handed to the client.
    pub value: String,
    /// The user this session belongs to.
    pub user_id: UserId,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires unless validation slides it forward.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Returns true if the token has passed its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Contract for the token store as consumed by the auth service.
///
/// All mutations are keyed by token value so concurrent and retried calls
/// stay idempotent; last-write-wins on TTL refresh is acceptable.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Issues a new token for the given user.
    async fn issue(&self, user_id: UserId, ttl: Duration) -> Result<AccessToken, AuthError>;

    /// Validates a token and, on success, slides its expiry to
    /// `now + extend_by`.
    ///
    /// An expired or unknown token yields `Ok(None)`, never an error
    /// distinct from "not authorized".
    async fn validate(
        &self,
        value: &str,
        extend_by: Duration,
    ) -> Result<Option<UserId>, AuthError>;

    /// Looks up a token without refreshing its TTL.
    async fn lookup(&self, value: &str) -> Result<Option<AccessToken>, AuthError>;

    /// Revokes a token. Revoking an unknown token is a no-op success
    /// (idempotent logout).
    async fn revoke(&self, value: &str) -> Result<(), AuthError>;
}

/// In-process token store.
///
/// Backs the default wiring and all tests; a Redis-backed store would slot
/// in behind the same trait.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl InMemoryTokenStore {
    /// Creates a new empty token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (issued, not yet revoked) tokens.
    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn issue(&self, user_id: UserId, ttl: Duration) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let token = AccessToken {
            value: Uuid::new_v4().simple().to_string(),
            user_id,
            issued_at: now,
            expires_at: now + ttl,
        };
        self.tokens
            .write()
            .await
            .insert(token.value.clone(), token.clone());
        Ok(token)
    }

    async fn validate(
        &self,
        value: &str,
        extend_by: Duration,
    ) -> Result<Option<UserId>, AuthError> {
        let mut tokens = self.tokens.write().await;
        match tokens.entry(value.to_string()) {
            Entry::Occupied(entry) if entry.get().is_expired() => {
                // Natural expiry: drop the entry on first observation.
                entry.remove();
                Ok(None)
            }
            Entry::Occupied(mut entry) => {
                let token = entry.get_mut();
                token.expires_at = Utc::now() + extend_by;
                Ok(Some(token.user_id))
            }
            Entry::Vacant(_) => Ok(None),
        }
    }

    async fn lookup(&self, value: &str) -> Result<Option<AccessToken>, AuthError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(value).filter(|t| !t.is_expired()).cloned())
    }

    async fn revoke(&self, value: &str) -> Result<(), AuthError> {
        self.tokens.write().await.remove(value);
        Ok(())
    }
}
