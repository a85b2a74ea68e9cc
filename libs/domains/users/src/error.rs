use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_helpers::errors::messages;
use axum_helpers::{AuthError, ErrorResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Username already registered")]
    DuplicateUsername(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::DuplicateUsername(username) => {
                tracing::debug!(username = %username, "Signup with taken username");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(
                        messages::CODE_CONFLICT,
                        "BAD_REQUEST",
                        "Username already registered",
                    )),
                )
                    .into_response()
            }
            UserError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(ErrorResponse::new(
                    messages::CODE_UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Invalid credentials",
                )),
            )
                .into_response(),
            UserError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(messages::CODE_VALIDATION, "BAD_REQUEST", msg)),
            )
                .into_response(),
            UserError::Auth(e) => e.into_response(),
            UserError::PasswordHash(msg) | UserError::Database(msg) => {
                tracing::error!("User operation failed: {}", msg);
                ErrorResponse::internal().into_response()
            }
        }
    }
}
