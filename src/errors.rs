//! # API Error Types
//!
//! Errors surfaced to HTTP callers. Each variant maps to a stable error code and
//! status, and renders as `{"error": {"code", "message", "details"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error type for the grocery list API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was rejected before any work was done
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more requested recipes do not exist
    #[error("Recipes not found: {}", format_ids(.missing_ids))]
    RecipesNotFound { missing_ids: Vec<i64> },

    /// The recipe store failed
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn format_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::Validation,
            ApiError::RecipesNotFound { .. } => ErrorCode::NotFound,
            ApiError::Internal(_) => ErrorCode::Internal,
        }
    }

    fn details(&self) -> serde_json::Value {
        match self {
            ApiError::RecipesNotFound { missing_ids } => {
                serde_json::json!({ "missing_ids": missing_ids })
            }
            _ => serde_json::Value::Null,
        }
    }
}

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorResponseDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<&ApiError> for ErrorResponse {
    fn from(error: &ApiError) -> Self {
        // Store failures are logged server-side; callers get a generic message
        let message = match error {
            ApiError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        Self {
            error: ErrorResponseDetails {
                code: error.code(),
                message,
                details: error.details(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            tracing::error!(error = ?source, "Request failed with an internal error");
        }

        let status = self.code().http_status();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
