//! Auth client capability consumed by per-call interceptors.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::AuthError;
use crate::service::AuthService;

/// Remote contract of the auth service as seen by other services.
///
/// Interceptors hold this as an injected capability so test doubles can
/// simulate approval, denial, and unavailability deterministically.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Asks whether the method is exempt from token validation.
    async fn is_api_whitelist(&self, full_method_name: &str) -> Result<bool, AuthError>;

    /// Validates a token, sliding its expiry forward by `duration_secs`.
    async fn get_auth(&self, access_token: &str, duration_secs: i64) -> Result<bool, AuthError>;
}

#[derive(Debug, Default)]
struct FaultState {
    fail_on_whitelist: bool,
    fail_on_get_auth: bool,
}

/// Auth client backed by a co-located [`AuthService`].
///
/// Carries fault switches so tests can simulate the auth service being
/// unreachable for either call.
#[derive(Clone)]
pub struct InProcessAuthClient {
    service: Arc<AuthService>,
    faults: Arc<RwLock<FaultState>>,
}

impl InProcessAuthClient {
    /// Creates a client over the given service.
    pub fn new(service: Arc<AuthService>) -> Self {
        Self {
            service,
            faults: Arc::new(RwLock::new(FaultState::default())),
        }
    }

    /// Configures the whitelist check to fail as unreachable.
    pub fn set_fail_on_whitelist(&self, fail: bool) {
        self.faults.write().unwrap().fail_on_whitelist = fail;
    }

    /// Configures token validation to fail as unreachable.
    pub fn set_fail_on_get_auth(&self, fail: bool) {
        self.faults.write().unwrap().fail_on_get_auth = fail;
    }
}

#[async_trait]
impl AuthClient for InProcessAuthClient {
    async fn is_api_whitelist(&self, full_method_name: &str) -> Result<bool, AuthError> {
        if self.faults.read().unwrap().fail_on_whitelist {
            return Err(AuthError::Unavailable(
                "whitelist check unreachable".to_string(),
            ));
        }
        Ok(self.service.is_api_whitelist(full_method_name))
    }

    async fn get_auth(&self, access_token: &str, duration_secs: i64) -> Result<bool, AuthError> {
        if self.faults.read().unwrap().fail_on_get_auth {
            return Err(AuthError::Unavailable(
                "token validation unreachable".to_string(),
            ));
        }
        self.service.get_auth(access_token, duration_secs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::InMemoryTokenStore;
    use crate::whitelist::ApiWhitelist;
    use common::UserId;

    fn client() -> (InProcessAuthClient, Arc<AuthService>) {
        let whitelist: ApiWhitelist = ["/v1/user/login"].into_iter().collect();
        let service = Arc::new(AuthService::new(
            Arc::new(InMemoryTokenStore::new()),
            whitelist,
        ));
        (InProcessAuthClient::new(service.clone()), service)
    }

    #[tokio::test]
    async fn test_delegates_to_service() {
        let (client, service) = client();

        assert!(client.is_api_whitelist("/v1/user/login").await.unwrap());
        assert!(!client.is_api_whitelist("/v1/order/create").await.unwrap());

        let token = service.issue_token(UserId::new()).await.unwrap();
        assert!(client.get_auth(&token.value, 3600).await.unwrap());
        assert!(!client.get_auth("bogus", 3600).await.unwrap());
    }

    #[tokio::test]
    async fn test_fault_switches() {
        let (client, _service) = client();

        client.set_fail_on_whitelist(true);
        assert!(matches!(
            client.is_api_whitelist("/v1/user/login").await,
            Err(AuthError::Unavailable(_))
        ));
        client.set_fail_on_whitelist(false);
        assert!(client.is_api_whitelist("/v1/user/login").await.is_ok());

        client.set_fail_on_get_auth(true);
        assert!(matches!(
            client.get_auth("any", 3600).await,
            Err(AuthError::Unavailable(_))
        ));
    }
}
