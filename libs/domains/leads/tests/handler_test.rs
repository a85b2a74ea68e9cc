//! Handler tests for the Leads domain
//!
//! Exercise the HTTP surface against in-memory storage, repository and
//! broker: multipart intake, bearer auth, role checks, status codes and
//! the shared error body.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig, Role};
use domain_leads::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use stream_worker::{MemoryBackend, ProducerConfig, StreamProducer};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";
const BOUNDARY: &str = "lead-form-boundary";

struct TestApp {
    router: Router,
    broker: MemoryBackend,
    auth: JwtAuth,
}

impl TestApp {
    fn new() -> Self {
        let broker = MemoryBackend::new();
        let producer = Arc::new(StreamProducer::new(broker.clone(), ProducerConfig::default()));
        let service = LeadService::new(
            InMemoryLeadRepository::new(),
            InMemoryResumeStorage::default(),
            EventPublisher::new(producer, "new_leads"),
        );
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));

        Self {
            router: handlers::router(service, auth.clone()),
            broker,
            auth,
        }
    }

    fn token(&self, role: Role) -> String {
        self.auth.issue("tester", role).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, json_body(response.into_body()).await)
    }

    async fn create(&self, first: &str, last: &str, email: &str) -> (StatusCode, Value) {
        let body = multipart(
            &[("first_name", first), ("last_name", last), ("email", email)],
            Some(("resume.pdf", &b"%PDF"[..])),
        );
        self.send(form_request("POST", "/leads", body, None)).await
    }
}

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn form_request(method: &str, uri: &str, body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn patch_status(body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri("/leads/status")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_lead_returns_201_pending() {
    let app = TestApp::new();

    let (status, lead) = app.create("John", "Doe", "john@test.com").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lead["status"], "PENDING");
    assert_eq!(lead["resume_path"], "john@test.com/resume/resume.pdf");
    assert!(lead["resume_url"].as_str().unwrap().contains("john%40test.com"));
}

#[tokio::test]
async fn test_create_lead_publishes_event() {
    let app = TestApp::new();

    let (_, lead) = app.create("John", "Doe", "john@test.com").await;

    let entries = app.broker.entries("new_leads");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key(), lead["id"].as_str());

    let event = entries[0].decode_json().unwrap();
    assert_eq!(event["event_type"], "lead.created");
    assert_eq!(event["lead_data"]["email"], "john@test.com");
    assert_eq!(event["metadata"]["source"], "lead_service");
}

#[tokio::test]
async fn test_create_lead_succeeds_when_broker_is_down() {
    let app = TestApp::new();
    app.broker.set_available(false);

    let (status, _) = app.create("John", "Doe", "john@test.com").await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(app.broker.entries("new_leads").is_empty());
}

#[tokio::test]
async fn test_duplicate_email_returns_409() {
    let app = TestApp::new();
    app.create("John", "Doe", "john@test.com").await;

    let (status, body) = app.create("Johnny", "Doe", "john@test.com").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
    assert!(body["message"].as_str().unwrap().contains("john@test.com"));
}

#[tokio::test]
async fn test_create_lead_validation_errors() {
    let app = TestApp::new();

    let (status, body) = app.create("John", "Doe", "not-an-email").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));

    let no_resume = multipart(
        &[("first_name", "John"), ("last_name", "Doe"), ("email", "john@test.com")],
        None,
    );
    let (status, body) = app.send(form_request("POST", "/leads", no_resume, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file provided");

    let no_name = multipart(&[("last_name", "Doe"), ("email", "john@test.com")], Some(("r.pdf", &b"%PDF"[..])));
    let (status, _) = app.send(form_request("POST", "/leads", no_name, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/leads", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app.send(get("/leads", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_leads_paginates() {
    let app = TestApp::new();
    for i in 0..3 {
        app.create("Lead", "Person", &format!("lead{i}@test.com")).await;
    }
    let token = app.token(Role::Client);

    let (status, page) = app.send(get("/leads?page=1&page_size=2", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["leads"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 3);
    assert_eq!(page["total_pages"], 2);

    let (status, page) = app.send(get("/leads", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
    assert_eq!(page["page_size"], 10);
}

#[tokio::test]
async fn test_list_leads_rejects_bad_paging() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney);

    let (status, _) = app.send(get("/leads?page=0", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(get("/leads?page_size=101", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_leads_far_page_is_empty() {
    let app = TestApp::new();
    let token = app.token(Role::Attorney);
    app.create("John", "Doe", "john@test.com").await;

    let (status, page) = app
        .send(get("/leads?page=9223372036854775807&page_size=100", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["leads"].as_array().unwrap().len(), 0);
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_get_lead_by_id() {
    let app = TestApp::new();
    let (_, created) = app.create("John", "Doe", "john@test.com").await;
    let token = app.token(Role::Client);

    let uri = format!("/leads/{}", created["id"].as_str().unwrap());
    let (status, lead) = app.send(get(&uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead, created);

    let missing = format!("/leads/{}", uuid::Uuid::new_v4());
    let (status, body) = app.send(get(&missing, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = app.send(get("/leads/not-a-uuid", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attorney_updates_status() {
    let app = TestApp::new();
    app.create("John", "Doe", "john@test.com").await;

    let request = patch_status(
        json!({"email": "john@test.com", "status": "REACHED_OUT"}),
        &app.token(Role::Attorney),
    );
    let (status, lead) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["status"], "REACHED_OUT");
}

#[tokio::test]
async fn test_client_cannot_update_status() {
    let app = TestApp::new();
    app.create("John", "Doe", "john@test.com").await;

    let request = patch_status(
        json!({"email": "john@test.com", "status": "REACHED_OUT"}),
        &app.token(Role::Client),
    );
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Attorney role required.");
}

#[tokio::test]
async fn test_update_status_errors() {
    let app = TestApp::new();
    app.create("John", "Doe", "john@test.com").await;
    let token = app.token(Role::Attorney);

    let (status, _) = app
        .send(patch_status(json!({"email": "john@test.com", "status": "CLOSED"}), &token))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(patch_status(json!({"email": "nobody@test.com", "status": "REACHED_OUT"}), &token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_updates_only_provided_fields() {
    let app = TestApp::new();
    let (_, created) = app.create("John", "Doe", "john@test.com").await;
    let token = app.token(Role::Client);
    let uri = format!("/leads/{}", created["id"].as_str().unwrap());

    let body = multipart(&[("last_name", "Smith"), ("status", "REACHED_OUT")], None);
    let (status, lead) = app.send(form_request("PUT", &uri, body, Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["first_name"], "John");
    assert_eq!(lead["last_name"], "Smith");
    assert_eq!(lead["status"], "REACHED_OUT");
    assert_eq!(lead["resume_path"], created["resume_path"]);
}

#[tokio::test]
async fn test_put_rejects_unknown_status_and_missing_lead() {
    let app = TestApp::new();
    let (_, created) = app.create("John", "Doe", "john@test.com").await;
    let token = app.token(Role::Client);

    let uri = format!("/leads/{}", created["id"].as_str().unwrap());
    let body = multipart(&[("status", "CLOSED")], None);
    let (status, _) = app.send(form_request("PUT", &uri, body, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/leads/{}", uuid::Uuid::new_v4());
    let body = multipart(&[("first_name", "Jane")], None);
    let (status, _) = app.send(form_request("PUT", &missing, body, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
