//! Error taxonomy for the HR service
//!
//! Every variant maps to one HTTP status and renders as `{"message": "..."}`.
//! Infrastructure failures are logged in full and surface with a generic
//! message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::password::PasswordError;

/// Custom error type for the HR service
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// No bearer token on the request
    #[error("Missing token")]
    MissingToken,

    /// Bad signature, malformed or expired token
    #[error("Invalid token")]
    InvalidToken,

    /// Unknown username or wrong password
    #[error("{0}")]
    InvalidCredentials(String),

    /// Role, permission or ownership denial
    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Duplicate unique field
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shared message for failed logins; identical for unknown users and bad passwords
    pub fn invalid_credentials() -> Self {
        AppError::InvalidCredentials("Invalid credentials".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::InvalidToken | AppError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(DatabaseError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Database(DatabaseError::ForeignKey(_)) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; never exposes internal detail
    pub fn message(&self) -> String {
        match self {
            AppError::Database(DatabaseError::Conflict(_)) => "Resource already exists".to_string(),
            AppError::Database(DatabaseError::ForeignKey(_)) => {
                "Referenced employee does not exist".to_string()
            }
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "message": self.message(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::Validation("Invalid id".to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Type alias for service results
pub type AppResult<T> = Result<T, AppError>;
