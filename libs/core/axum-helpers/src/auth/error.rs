use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::errors::{ErrorResponse, messages};

/// Missing, invalid or expired credentials, or a role mismatch
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("Failed to create token: {0}")]
    TokenCreation(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, code) = match &self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", messages::CODE_UNAUTHORIZED)
            }
            AuthError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", messages::CODE_FORBIDDEN),
            AuthError::TokenCreation(e) => {
                tracing::error!(error = %e, "Token creation failed");
                return ErrorResponse::internal().into_response();
            }
        };

        let body = Json(ErrorResponse::new(code, error, self.to_string()));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
