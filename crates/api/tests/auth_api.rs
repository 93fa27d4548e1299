//! Bearer token and role enforcement at the HTTP boundary.

mod common;

use axum::http::{Method, StatusCode};
use common::{expect_status, get, put_json, send, student, submit_project, test_config};
use portal_api::auth::jwt::{generate_access_token, JwtConfig};
use portal_core::actor::Actor;
use portal_core::roles::Role;
use serde_json::json;

#[tokio::test]
async fn missing_header_is_401() {
    let app = common::build_test_app();
    let response = send(&app.router, Method::GET, "/api/v1/projects", None, None).await;

    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let app = common::build_test_app();
    let response = send(
        &app.router,
        Method::GET,
        "/api/v1/projects",
        Some("not-a-jwt"),
        None,
    )
    .await;

    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_401() {
    let app = common::build_test_app();
    let foreign = JwtConfig {
        secret: "someone-else".to_string(),
        access_token_expiry_mins: 15,
    };
    let token = generate_access_token(&student(), &foreign).unwrap();
    let response = send(
        &app.router,
        Method::GET,
        "/api/v1/projects",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    let app = common::build_test_app();
    let expired = JwtConfig {
        access_token_expiry_mins: -10,
        ..test_config().jwt
    };
    let token = generate_access_token(&student(), &expired).unwrap();
    let response = send(
        &app.router,
        Method::GET,
        "/api/v1/projects",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_cannot_decide_projects() {
    let app = common::build_test_app();
    let id = submit_project(&app.router, &student(), "Crop Mesh").await;

    let response = put_json(
        &app.router,
        &format!("/api/v1/projects/{id}/status"),
        &student(),
        json!({ "status": "Approved" }),
    )
    .await;

    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn summary_is_principal_only() {
    let app = common::build_test_app();
    let admin = Actor::new(50, Role::Admin, "admin@uni.edu", "Ad Min");

    let response = get(&app.router, "/api/v1/admin/summary", &admin).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app.router, "/api/v1/admin/summary", &common::principal()).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total_projects"], 0);
}

#[tokio::test]
async fn unknown_role_claim_is_401() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use portal_api::auth::jwt::Claims;

    let app = common::build_test_app();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: 5,
        role: "janitor".to_string(),
        email: "j@uni.edu".to_string(),
        name: "Jan".to_string(),
        exp: now + 600,
        iat: now,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(test_config().jwt.secret.as_bytes()),
    )
    .unwrap();

    let response = send(
        &app.router,
        Method::GET,
        "/api/v1/projects",
        Some(&token),
        None,
    )
    .await;
    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["error"], "Token carries an unknown role");
}
