//! User registration and session endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use domain::{OrderRepository, UserRepository};
use product::{ProductRepository, StockService};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::bearer_token;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expire_in: i64,
}

#[derive(Serialize)]
pub struct UserInfoResponse {
    pub user_id: String,
    pub username: String,
    pub created_at: String,
}

// -- Handlers --

/// POST /v1/user/register — create an account (whitelisted).
#[tracing::instrument(skip(state, req))]
pub async fn register<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    state.users.register(&req.username, &req.password).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok_empty()))
}

/// POST /v1/user/login — verify credentials and issue a token
/// (whitelisted).
#[tracing::instrument(skip(state, req))]
pub async fn login<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let result = state.users.login(&req.username, &req.password).await?;

    Ok(ApiResponse::ok(LoginResponse {
        access_token: result.access_token,
        expire_in: result.expire_in,
    }))
}

/// POST /v1/user/logout — revoke the bearer token.
#[tracing::instrument(skip(state, headers))]
pub async fn logout<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let token = bearer_token(&headers).ok_or(ApiError::Unauthenticated)?;
    state.users.logout(&token).await?;
    Ok(ApiResponse::ok_empty())
}

/// GET /v1/user/info — resolve the bearer token to the caller's detail.
#[tracing::instrument(skip(state, headers))]
pub async fn info<R, U, P>(
    State(state): State<Arc<AppState<R, U, P>>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<UserInfoResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    U: UserRepository + 'static,
    P: StockService + ProductRepository + Clone + 'static,
{
    let token = bearer_token(&headers).ok_or(ApiError::Unauthenticated)?;
    let detail = state.users.info(&token).await?;

    Ok(ApiResponse::ok(UserInfoResponse {
        user_id: detail.id.to_string(),
        username: detail.username,
        created_at: detail.created_at.to_rfc3339(),
    }))
}
