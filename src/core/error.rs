//! Typed error handling for the shop API
//!
//! Every store and handler returns [`ShopResult`]. The variants mirror the
//! failure modes of the query layer so handlers can map them to HTTP
//! statuses without inspecting messages.
//!
//! # Error Categories
//!
//! - [`ShopError::NotFound`]: an expected row is absent
//! - [`ShopError::MultipleRows`]: a single-row lookup matched several rows
//! - [`ShopError::Validation`]: malformed or missing input (see [`ValidationError`])
//! - [`ShopError::ConstraintViolation`]: foreign key, uniqueness or check failure
//! - [`ShopError::InvalidRange`]: empty or inverted time window in an aggregation
//! - [`ShopError::Storage`]: any other backend failure
//!
//! # Example
//!
//! ```rust,ignore
//! match store.get_customer(7).await {
//!     Ok(customer) => println!("{}", customer.first_name),
//!     Err(ShopError::NotFound { .. }) => println!("no such customer"),
//!     Err(e) => eprintln!("store failure: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// The main error type for the shop API
#[derive(Debug, Error)]
pub enum ShopError {
    /// An expected row is absent
    #[error("{resource} '{key}' not found")]
    NotFound { resource: &'static str, key: String },

    /// A lookup that must return one row returned several
    #[error("expected exactly one {resource} row, found {count}")]
    MultipleRows { resource: &'static str, count: usize },

    /// Malformed or missing input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Foreign key, uniqueness or check failure reported by the store
    #[error("constraint violation: {message}")]
    ConstraintViolation {
        message: String,
        constraint: Option<String>,
    },

    /// Zero or negative time window
    #[error("invalid range: {message}")]
    InvalidRange { message: String },

    /// Any other storage backend failure
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl ShopError {
    pub fn not_found(resource: &'static str, key: impl ToString) -> Self {
        ShopError::NotFound {
            resource,
            key: key.to_string(),
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        ShopError::ConstraintViolation {
            message: message.into(),
            constraint: None,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ShopError::Storage {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShopError::MultipleRows { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ShopError::Validation(_) => StatusCode::BAD_REQUEST,
            ShopError::ConstraintViolation { .. } => StatusCode::CONFLICT,
            ShopError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            ShopError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ShopError::NotFound { .. } => "NOT_FOUND",
            ShopError::MultipleRows { .. } => "MULTIPLE_ROWS",
            ShopError::Validation(_) => "VALIDATION_ERROR",
            ShopError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            ShopError::InvalidRange { .. } => "INVALID_RANGE",
            ShopError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Convert to the error envelope
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: "error",
            code: self.error_code(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ShopError::NotFound { resource, key } => Some(serde_json::json!({
                "resource": resource,
                "key": key,
            })),
            ShopError::ConstraintViolation {
                constraint: Some(constraint),
                ..
            } => Some(serde_json::json!({ "constraint": constraint })),
            ShopError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

/// Error envelope returned to HTTP clients
///
/// Shares the `status` / `message` shape of the success envelope so clients
/// can branch on `status` alone.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Request body is not valid JSON for the expected shape
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Path segment could not be parsed
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// Query string parameter is missing or malformed
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        flatten_validation_errors("", &errors, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ShopError::Validation(errors.into())
    }
}

/// Walk nested struct and list errors, producing dotted field paths such as
/// `products[0].quantity`.
fn flatten_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<FieldValidationError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .clone()
                        .unwrap_or_else(|| Cow::Owned(err.code.to_string()));
                    out.push(FieldValidationError {
                        field: path.clone(),
                        message: message.into_owned(),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_validation_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_validation_errors(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for ShopError {
    fn from(err: sqlx::Error) -> Self {
        crate::storage::gateway::map_sqlx_error(err)
    }
}

/// A specialized Result type for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
