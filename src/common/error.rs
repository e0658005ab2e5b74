// Error handling types for the API

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::error;

use super::validation::{FieldName, ValidationResult};
use crate::services::StoreError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ValidationFailed(ValidationResult),
    DuplicateEmail(String),
    ServiceUnavailable(String),
    InternalServer(String),
    Store(StoreError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::ValidationFailed(result) => {
                let fields: Vec<&str> = result.errors.keys().map(FieldName::as_str).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
            ApiError::DuplicateEmail(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::Store(e) => write!(f, "Store Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<FieldName, String>>,
}

impl ErrorResponse {
    fn plain(error: String, code: &str) -> Self {
        Self {
            error,
            code: code.to_string(),
            is_valid: None,
            errors: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::plain(msg, "BAD_REQUEST"))
            }
            ApiError::ValidationFailed(result) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Registration form is invalid".to_string(),
                    code: "VALIDATION_ERROR".to_string(),
                    is_valid: Some(false),
                    errors: Some(result.errors),
                },
            ),
            ApiError::DuplicateEmail(msg) => {
                (StatusCode::CONFLICT, ErrorResponse::plain(msg, "DUPLICATE_EMAIL"))
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::plain(msg, "SERVICE_UNAVAILABLE"),
            ),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::plain(msg, "INTERNAL_SERVER_ERROR"),
            ),
            ApiError::Store(e) => {
                error!(error = %e, "Registration store error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::plain(
                        "Storage operation failed".to_string(),
                        "STORAGE_ERROR",
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            ApiError::ValidationFailed(result)
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail(e.to_string()),
            StoreError::Unavailable => ApiError::ServiceUnavailable(e.to_string()),
            other => ApiError::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
