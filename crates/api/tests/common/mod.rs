//! Shared harness for the API integration tests.
//!
//! The app runs against the in-memory store and a recording notifier, so
//! these tests need no database or SMTP server.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use portal_api::auth::jwt::{generate_access_token, JwtConfig};
use portal_api::config::ServerConfig;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_core::actor::Actor;
use portal_core::labs::LabCatalog;
use portal_core::roles::Role;
use portal_workflow::{InMemoryStore, RecordingNotifier};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The router plus the notifier it sends through.
pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build the full application router, the same one `main.rs` serves.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::new(
        Arc::new(InMemoryStore::new()),
        notifier.clone(),
        LabCatalog::default(),
        config.clone(),
    );
    TestApp {
        router: build_app_router(state, &config),
        notifier,
    }
}

// ---------------------------------------------------------------------------
// Callers
// ---------------------------------------------------------------------------

pub fn student() -> Actor {
    Actor::new(1, Role::Student, "stu@uni.edu", "Stu Dent")
}

pub fn second_student() -> Actor {
    Actor::new(2, Role::Student, "ana@uni.edu", "Ana Lyst")
}

pub fn faculty() -> Actor {
    Actor::new(10, Role::Faculty, "prof@uni.edu", "Prof Esser")
}

pub fn principal() -> Actor {
    Actor::new(99, Role::Principal, "principal@uni.edu", "Prin Cipal")
}

/// Sign a token for `actor` with the test secret.
pub fn token_for(actor: &Actor) -> String {
    generate_access_token(actor, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send one request through a clone of `app`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, actor: &Actor) -> Response {
    send(app, Method::GET, uri, Some(&token_for(actor)), None).await
}

pub async fn post_json(app: &Router, uri: &str, actor: &Actor, body: Value) -> Response {
    send(app, Method::POST, uri, Some(&token_for(actor)), Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, actor: &Actor, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(&token_for(actor)), Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, actor: &Actor) -> Response {
    send(app, Method::DELETE, uri, Some(&token_for(actor)), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_status(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn project_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Low-power mesh network for crop sensors",
        "domain": "IoT",
        "department": "IT",
        "project_type": "UserDefined",
        "year": "2024-25",
        "team_members": [{ "name": "Tea Mate", "email": "mate@uni.edu" }],
        "file_url": "uploads/synopsis.pdf"
    })
}

/// Submit a project as `actor` and return its id.
pub async fn submit_project(app: &Router, actor: &Actor, title: &str) -> i64 {
    let response = post_json(app, "/api/v1/projects", actor, project_body(title)).await;
    let json = expect_status(response, StatusCode::CREATED).await;
    json["data"]["id"].as_i64().unwrap()
}

pub fn booking_body(project_id: i64) -> Value {
    json!({
        "lab": "IoT",
        "date": "2025-01-20",
        "slot": "10:00-12:00",
        "reason": "Sensor calibration",
        "project_id": project_id
    })
}
