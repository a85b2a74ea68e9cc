use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_helpers::{ErrorResponse, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{LoginRequest, SignupRequest, TokenResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "auth";

/// OpenAPI documentation for the auth endpoints
#[derive(OpenApi)]
#[openapi(
    paths(signup, login),
    components(schemas(SignupRequest, LoginRequest, TokenResponse, ErrorResponse)),
    tags((name = TAG, description = "Signup and login"))
)]
pub struct ApiDoc;

/// `/signup` and `/login`, meant to be nested under `/auth`
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/signup", post(signup::<R>))
        .route("/login", post(login::<R>))
        .with_state(Arc::new(service))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = TAG,
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input or username taken", body = ErrorResponse),
        (status = 422, description = "Unknown role", body = ErrorResponse)
    )
)]
async fn signup<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<SignupRequest>,
) -> UserResult<impl IntoResponse> {
    let token = service.signup(input).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<TokenResponse>> {
    Ok(Json(service.login(input).await?))
}
