//! Uniform response envelope.
//!
//! Every business response carries a numeric code, a human-readable
//! message, and an optional typed payload. Code 0 means success; error
//! codes mirror the transport-level status the error maps to.

use axum::Json;
use serde::Serialize;

/// The response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload in a success envelope.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: 0,
            message: "ok".to_string(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// A success envelope with no payload.
    pub fn ok_empty() -> Json<Self> {
        Json(Self {
            code: 0,
            message: "ok".to_string(),
            data: None,
        })
    }
}
