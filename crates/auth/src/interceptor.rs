//! Per-call authorization decision.
//!
//! The decision is transport-agnostic: the HTTP middleware extracts the
//! method name and bearer credential and delegates here, which keeps both
//! branches (whitelist-exempt and token-checked) testable without a server.

use crate::client::AuthClient;
use crate::error::AuthError;

/// Sliding-expiration window applied on every successful validation.
///
/// Validating a token refreshes its TTL, keeping active sessions alive
/// indefinitely; idle sessions lapse after seven days.
pub const TOKEN_EXTENSION_SECS: i64 = 7 * 24 * 60 * 60;

/// Decides whether a call may reach its handler.
///
/// Fail-closed: if the whitelist check or token validation cannot be
/// completed, the call is denied rather than admitted. A single remote
/// failure is a denial, not an error to retry. Every denial reads as
/// "please log in" to the caller; the distinct cause is only logged.
pub async fn authorize<C: AuthClient + ?Sized>(
    client: &C,
    full_method_name: &str,
    bearer: Option<&str>,
) -> Result<(), AuthError> {
    match client.is_api_whitelist(full_method_name).await {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(e) => {
            tracing::info!(method = full_method_name, error = %e, "authorization failed: whitelist check unreachable");
            metrics::counter!("auth_denied_total", "reason" => "whitelist_unreachable")
                .increment(1);
            return Err(AuthError::Denied);
        }
    }

    let Some(token) = bearer else {
        tracing::info!(
            method = full_method_name,
            "authorization failed: no access token supplied"
        );
        metrics::counter!("auth_denied_total", "reason" => "missing_token").increment(1);
        return Err(AuthError::Denied);
    };

    match client.get_auth(token, TOKEN_EXTENSION_SECS).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::info!(
                method = full_method_name,
                "authorization failed: token invalid or expired"
            );
            metrics::counter!("auth_denied_total", "reason" => "invalid_token").increment(1);
            Err(AuthError::Denied)
        }
        Err(e) => {
            tracing::info!(method = full_method_name, error = %e, "authorization failed: token validation unreachable");
            metrics::counter!("auth_denied_total", "reason" => "auth_unreachable").increment(1);
            Err(AuthError::Denied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Scripted client covering each branch deterministically.
    struct StubClient {
        whitelist: Result<bool, ()>,
        auth: Result<bool, ()>,
    }

    #[async_trait]
    impl AuthClient for StubClient {
        async fn is_api_whitelist(&self, _full_method_name: &str) -> Result<bool, AuthError> {
            self.whitelist
                .map_err(|()| AuthError::Unavailable("down".to_string()))
        }

        async fn get_auth(
            &self,
            _access_token: &str,
            _duration_secs: i64,
        ) -> Result<bool, AuthError> {
            self.auth
                .map_err(|()| AuthError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_whitelisted_call_admits_without_token() {
        let client = StubClient {
            whitelist: Ok(true),
            auth: Ok(false),
        };
        assert!(authorize(&client, "/v1/user/login", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_whitelist_error_denies_fail_closed() {
        let client = StubClient {
            whitelist: Err(()),
            auth: Ok(true),
        };
        let result = authorize(&client, "/v1/order/create", Some("token")).await;
        assert!(matches!(result, Err(AuthError::Denied)));
    }

    #[tokio::test]
    async fn test_missing_token_denies() {
        let client = StubClient {
            whitelist: Ok(false),
            auth: Ok(true),
        };
        let result = authorize(&client, "/v1/order/create", None).await;
        assert!(matches!(result, Err(AuthError::Denied)));
    }

    #[tokio::test]
    async fn test_invalid_token_denies() {
        let client = StubClient {
            whitelist: Ok(false),
            auth: Ok(false),
        };
        let result = authorize(&client, "/v1/order/create", Some("stale")).await;
        assert!(matches!(result, Err(AuthError::Denied)));
    }

    #[tokio::test]
    async fn test_validation_error_denies() {
        let client = StubClient {
            whitelist: Ok(false),
            auth: Err(()),
        };
        let result = authorize(&client, "/v1/order/create", Some("token")).await;
        assert!(matches!(result, Err(AuthError::Denied)));
    }

    #[tokio::test]
    async fn test_valid_token_admits() {
        let client = StubClient {
            whitelist: Ok(false),
            auth: Ok(true),
        };
        assert!(
            authorize(&client, "/v1/order/create", Some("token"))
                .await
                .is_ok()
        );
    }
}
