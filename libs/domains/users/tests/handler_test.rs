//! Handler tests for the auth endpoints

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig, Role};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

fn auth() -> JwtAuth {
    JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!"))
}

fn app() -> Router {
    let service = UserService::new(InMemoryUserRepository::new(), auth());
    Router::new().nest("/auth", handlers::router(service))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_signup_returns_201_with_token() {
    let app = app();

    let (status, body) = post(
        &app,
        "/auth/signup",
        json!({"username": "alice", "password": "secret1", "role": "attorney"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["role"], "attorney");

    let principal = auth().verify(body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(principal.role, Role::Attorney);
}

#[tokio::test]
async fn test_duplicate_signup_returns_400() {
    let app = app();
    let body = json!({"username": "alice", "password": "secret1", "role": "client"});
    post(&app, "/auth/signup", body.clone()).await;

    let (status, error) = post(&app, "/auth/signup", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Username already registered");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = app();

    let (status, _) = post(
        &app,
        "/auth/signup",
        json!({"username": "al", "password": "secret1", "role": "client"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/auth/signup",
        json!({"username": "alice", "password": "123", "role": "client"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/auth/signup",
        json!({"username": "alice", "password": "secret1", "role": "admin"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login() {
    let app = app();
    post(
        &app,
        "/auth/signup",
        json!({"username": "bob", "password": "secret1", "role": "client"}),
    )
    .await;

    let (status, body) = post(&app, "/auth/login", json!({"username": "bob", "password": "secret1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "client");

    let (status, body) = post(&app, "/auth/login", json!({"username": "bob", "password": "wrong1"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = post(&app, "/auth/login", json!({"username": "nobody", "password": "secret1"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
