//! Structured error types for store and API responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TodoId;

/// Message returned when an id does not match any todo.
pub const NOT_FOUND_MESSAGE: &str = "Todo not found";

/// Message returned when a todo is created without text.
pub const TEXT_REQUIRED_MESSAGE: &str = "Todo text is required";

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidBody,

    // Not found errors
    TodoNotFound,

    // Internal errors
    InternalError,
}

/// Errors raised by the store and surfaced by the API layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Todo not found")]
    NotFound { id: Option<TodoId> },

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    Internal(String),
}

impl TodoError {
    pub fn text_required() -> Self {
        Self::Validation {
            message: TEXT_REQUIRED_MESSAGE.to_string(),
            field: Some("text".to_string()),
        }
    }

    pub fn not_found(id: TodoId) -> Self {
        Self::NotFound { id: Some(id) }
    }

    /// Not found for a path segment that is not a valid id at all.
    pub fn unknown_id() -> Self {
        Self::NotFound { id: None }
    }

    pub fn invalid_body(reason: impl Into<String>) -> Self {
        Self::InvalidBody(reason.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::MissingRequiredField,
            Self::NotFound { .. } => ErrorCode::TodoNotFound,
            Self::InvalidBody(_) => ErrorCode::InvalidBody,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// JSON error payload: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = ?self.code(), "{}", self);
        } else {
            tracing::debug!(code = ?self.code(), status = status.as_u16(), "{}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for store operations.
pub type TodoResult<T> = std::result::Result<T, TodoError>;
