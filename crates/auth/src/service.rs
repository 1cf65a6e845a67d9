//! Auth service facade owning the token store and the API whitelist.

use std::sync::Arc;

use chrono::Duration;
use common::UserId;

use crate::error::AuthError;
use crate::token::{AccessToken, DEFAULT_TOKEN_TTL_SECS, TokenStore};
use crate::whitelist::ApiWhitelist;

/// The auth service.
///
/// Owns the token store exclusively; other services reach it through
/// [`crate::AuthClient`] or through this facade when co-located (login,
/// logout, identity resolution).
pub struct AuthService {
    tokens: Arc<dyn TokenStore>,
    whitelist: ApiWhitelist,
    token_ttl: Duration,
}

impl AuthService {
    /// Creates an auth service over the given token store and whitelist.
    pub fn new(tokens: Arc<dyn TokenStore>, whitelist: ApiWhitelist) -> Self {
        Self {
            tokens,
            whitelist,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Overrides the default token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Returns the configured token lifetime in seconds.
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.num_seconds()
    }

    /// Returns true if the method is exempt from token validation.
    pub fn is_api_whitelist(&self, full_method_name: &str) -> bool {
        self.whitelist.contains(full_method_name)
    }

    /// Validates a token and slides its expiry forward by `duration_secs`.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn get_auth(
        &self,
        access_token: &str,
        duration_secs: i64,
    ) -> Result<bool, AuthError> {
        let user_id = self
            .tokens
            .validate(access_token, Duration::seconds(duration_secs))
            .await?;
        Ok(user_id.is_some())
    }

    /// Issues a fresh token for a user who just authenticated.
    #[tracing::instrument(skip(self))]
    pub async fn issue_token(&self, user_id: UserId) -> Result<AccessToken, AuthError> {
        self.tokens.issue(user_id, self.token_ttl).await
    }

    /// Revokes a token (logout). Unknown tokens revoke successfully.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn revoke_token(&self, access_token: &str) -> Result<(), AuthError> {
        self.tokens.revoke(access_token).await
    }

    /// Resolves a token to its user without refreshing the TTL.
    #[tracing::instrument(skip(self, access_token))]
    pub async fn identity(&self, access_token: &str) -> Result<Option<UserId>, AuthError> {
        let token = self.tokens.lookup(access_token).await?;
        Ok(token.map(|t| t.user_id))
    }
}
