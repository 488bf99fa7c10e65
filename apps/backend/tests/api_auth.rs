//! Auth API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

/// Test registration yields a usable session token.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_returns_usable_token() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("register");

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "Registrant"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let token = body["token"].as_str().unwrap().to_string();
    let user_id: uuid::Uuid = body["user_id"].as_str().unwrap().parse().unwrap();
    assert!(!token.is_empty());

    let me = server
        .get("/api/users/me")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    me.assert_status_ok();
    let me_body: serde_json::Value = me.json();
    assert_eq!(me_body["name"], "Registrant");
    assert!(me_body["quizzes"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test registration rejects a blank email.
#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_blank_email() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/auth/register")
        .json(&fixtures::register_request("  ", "Nobody"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "email");
}

/// Test login round-trips registered credentials.
#[tokio::test]
#[ignore = "requires database"]
async fn test_login_round_trip() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let email = fixtures::unique_email("login");

    let register = server
        .post("/api/auth/register")
        .json(&fixtures::register_request(&email, "Login user"))
        .await;
    register.assert_status_ok();
    let registered: serde_json::Value = register.json();
    let user_id: uuid::Uuid = registered["user_id"].as_str().unwrap().parse().unwrap();

    let login = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, "hunter2"))
        .await;
    login.assert_status_ok();
    let body: serde_json::Value = login.json();
    assert_eq!(body["user_id"], registered["user_id"]);

    let wrong = server
        .post("/api/auth/login")
        .json(&fixtures::login_request(&email, "wrong-password"))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test federated sign-in creates the account exactly once.
#[tokio::test]
#[ignore = "requires database"]
async fn test_federated_creates_account_once() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let subject = uuid::Uuid::new_v4().to_string();

    let first = server
        .post("/api/auth/federated")
        .json(&fixtures::federated_request("google", &subject, "Fed user"))
        .await;
    first.assert_status_ok();
    let first_body: serde_json::Value = first.json();
    assert_eq!(first_body["created"], true);
    let user_id: uuid::Uuid = first_body["user_id"].as_str().unwrap().parse().unwrap();

    let second = server
        .post("/api/auth/federated")
        .json(&fixtures::federated_request("google", &subject, "Fed user"))
        .await;
    second.assert_status_ok();
    let second_body: serde_json::Value = second.json();
    assert_eq!(second_body["created"], false);
    assert_eq!(second_body["user_id"], first_body["user_id"]);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test protected routes require authentication.
#[tokio::test]
#[ignore = "requires database"]
async fn test_me_requires_auth() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server.get("/api/users/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
