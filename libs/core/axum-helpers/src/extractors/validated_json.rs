//! JSON extractor with automatic validation using the validator crate.

use crate::errors::{ErrorResponse, messages};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that runs `Validate` after deserializing.
///
/// - Malformed JSON or wrong field types (e.g. an unknown enum value) keep
///   axum's rejection status (400/415/422) with an [`ErrorResponse`] body.
/// - Validation failures are 400 with per-field details.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct SignupRequest {
///     #[validate(length(min = 3, max = 50))]
///     username: String,
/// }
///
/// async fn signup(ValidatedJson(payload): ValidatedJson<SignupRequest>) -> ... { }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            let body = ErrorResponse::new(
                messages::CODE_JSON_EXTRACTION,
                "INVALID_BODY",
                e.body_text(),
            );
            (e.status(), axum::Json(body)).into_response()
        })?;

        data.validate().map_err(|e| validation_response(&e))?;

        Ok(ValidatedJson(data))
    }
}

/// Render validator errors as a 400 with `{field: [{code, message, params}]}` details
pub fn validation_response(errors: &ValidationErrors) -> Response {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::json!(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    let body = ErrorResponse::new(messages::CODE_VALIDATION, "BAD_REQUEST", messages::VALIDATION_FAILED)
        .with_details(serde_json::Value::Object(details));

    (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
}
