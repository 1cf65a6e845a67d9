//! API error types with envelope and HTTP status mapping.

use auth::AuthError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError, UserError};
use product::ProductError;
use saga::SagaError;

use crate::response::ApiResponse;

/// API-level error type that maps to the uniform envelope.
#[derive(Debug)]
pub enum ApiError {
    /// The call was not admitted; always reads as "please log in".
    Unauthenticated,
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Saga execution error.
    Saga(SagaError),
    /// Product service error.
    Product(ProductError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Never leak whether the whitelist lookup failed, the token was
            // missing, or the token was invalid.
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "please log in".to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(&err),
            ApiError::Saga(err) => saga_error_to_response(&err),
            ApiError::Product(err) => product_error_to_response(&err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body: ApiResponse<()> = ApiResponse {
            code: status_code_to_envelope_code(status),
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

fn domain_error_to_response(err: &DomainError) -> (StatusCode, String) {
    match err {
        DomainError::Order(order_err) => match order_err {
            OrderError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
            OrderError::DuplicateOrderNo { .. } | OrderError::InvalidStatusTransition { .. } => {
                (StatusCode::CONFLICT, err.to_string())
            }
        },
        DomainError::User(user_err) => match user_err {
            UserError::UsernameExists { .. } | UserError::InvalidCredentials => {
                (StatusCode::CONFLICT, user_err.to_string())
            }
            UserError::NotFound => (StatusCode::NOT_FOUND, user_err.to_string()),
        },
        DomainError::Auth(AuthError::Denied) => {
            (StatusCode::UNAUTHORIZED, "please log in".to_string())
        }
        DomainError::Auth(_) | DomainError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn saga_error_to_response(err: &SagaError) -> (StatusCode, String) {
    match err {
        SagaError::OrderStep(domain_err) => domain_error_to_response(domain_err),
        SagaError::StockStep(product_err) => product_error_to_response(product_err),
        SagaError::CompensationFailed { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        SagaError::Aborted(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn product_error_to_response(err: &ProductError) -> (StatusCode, String) {
    match err {
        ProductError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ProductError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
        ProductError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        ProductError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// gRPC-flavoured numeric codes carried inside the envelope.
fn status_code_to_envelope_code(status: StatusCode) -> i32 {
    match status {
        StatusCode::BAD_REQUEST => 3,
        StatusCode::NOT_FOUND => 5,
        StatusCode::CONFLICT => 9,
        StatusCode::SERVICE_UNAVAILABLE => 14,
        StatusCode::UNAUTHORIZED => 16,
        _ => 13,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        ApiError::Product(err)
    }
}
