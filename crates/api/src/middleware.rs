//! Authorization middleware applied uniformly to every route.

use std::sync::Arc;

use auth::{AuthClient, authorize};
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Injected capability for the per-call gate.
#[derive(Clone)]
pub struct AuthGate {
    pub client: Arc<dyn AuthClient>,
}

impl AuthGate {
    /// Creates a gate over the given client.
    pub fn new(client: Arc<dyn AuthClient>) -> Self {
        Self { client }
    }
}

/// Gates every inbound call before its handler runs.
///
/// The request path plays the role of the fully-qualified method name. On
/// admission the request is forwarded unchanged.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let full_method_name = request.uri().path().to_string();
    let bearer = bearer_token(request.headers());

    authorize(gate.client.as_ref(), &full_method_name, bearer.as_deref())
        .await
        .map_err(|_| ApiError::Unauthenticated)?;

    Ok(next.run(request).await)
}

/// Extracts the bearer credential from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
