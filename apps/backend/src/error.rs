//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::services::assembly::AssemblyError;
use crate::services::recency::RecencyError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Gateway failure: {0}")]
    Gateway(String),

    #[error("Gateway call {0} timed out")]
    Timeout(&'static str),

    #[error("Quiz {quiz_id} was created but not linked to its author")]
    PartialCompletion { quiz_id: Uuid },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quiz_id: Option<Uuid>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
            ApiError::Gateway(_) => (StatusCode::BAD_GATEWAY, "gateway_failure"),
            ApiError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "gateway_timeout"),
            ApiError::PartialCompletion { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "partial_completion")
            }
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let field = match &self {
            ApiError::Validation { field, .. } => Some(*field),
            _ => None,
        };

        let quiz_id = match &self {
            ApiError::PartialCompletion { quiz_id } => Some(*quiz_id),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            field,
            quiz_id,
        });

        (status, body).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err.to_string())
    }
}

impl From<AssemblyError> for ApiError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::Validation(v) => ApiError::Validation {
                field: v.field(),
                message: v.to_string(),
            },
            AssemblyError::QuizNotFound(id) => ApiError::NotFound(format!("Quiz {}", id)),
            AssemblyError::UserNotFound(id) => ApiError::NotFound(format!("User {}", id)),
            AssemblyError::NoSession(id) => {
                ApiError::NotFound(format!("No authoring session for quiz {}", id))
            }
            AssemblyError::DetailsMissing(id) => {
                ApiError::BadRequest(format!("Quiz {} has no committed details yet", id))
            }
            AssemblyError::NotLinked { quiz_id } => ApiError::PartialCompletion { quiz_id },
            AssemblyError::Gateway(e) => ApiError::Gateway(e.to_string()),
            AssemblyError::Timeout(op) => ApiError::Timeout(op),
        }
    }
}

impl From<RecencyError> for ApiError {
    fn from(err: RecencyError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
