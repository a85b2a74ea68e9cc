use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::errors::messages;
use axum_helpers::{AuthError, ErrorResponse};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Persistence, storage or broker failure
    #[error("{0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type LeadResult<T> = Result<T, LeadError>;

impl LeadError {
    pub fn duplicate_email(email: &str) -> Self {
        LeadError::Conflict(format!("A lead with email {} already exists", email))
    }
}

impl From<StorageError> for LeadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingFilename => LeadError::Validation("No file provided".to_string()),
            StorageError::TooLarge { .. } => {
                LeadError::Validation("File too large (max 10MB)".to_string())
            }
            other => {
                tracing::error!(error = %other, "Resume storage failure");
                LeadError::Dependency("Failed to upload file".to_string())
            }
        }
    }
}

impl IntoResponse for LeadError {
    fn into_response(self) -> Response {
        let (status, code, error, message) = match self {
            LeadError::Validation(m) => (StatusCode::BAD_REQUEST, messages::CODE_VALIDATION, "BAD_REQUEST", m),
            LeadError::Conflict(m) => (StatusCode::CONFLICT, messages::CODE_CONFLICT, "CONFLICT", m),
            LeadError::NotFound(m) => (StatusCode::NOT_FOUND, messages::CODE_NOT_FOUND, "NOT_FOUND", m),
            LeadError::Dependency(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                messages::CODE_DEPENDENCY,
                "DEPENDENCY_FAILURE",
                m,
            ),
            LeadError::Auth(auth) => return auth.into_response(),
            LeadError::Internal(detail) => {
                tracing::error!(error = %detail, "Unhandled lead error");
                return ErrorResponse::internal().into_response();
            }
        };

        (status, Json(ErrorResponse::new(code, error, message))).into_response()
    }
}
