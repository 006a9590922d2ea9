//! Success envelope shared by every endpoint
//!
//! Failures use [`ErrorResponse`](crate::core::error::ErrorResponse) through
//! `ShopError`'s `IntoResponse` impl.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{"status": "success", "data": ..., "message": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: "success",
            data: Some(data),
            message: message.into(),
        }
    }
}

impl ApiResponse<()> {
    /// Acknowledgement without a payload
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            data: None,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
