//! Practice API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use uuid::Uuid;

use common::fixtures;
use common::TestContext;

async fn create_finished_quiz(server: &TestServer, token: &str, title: &str) -> Uuid {
    let created = server
        .post("/api/quizzes")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(token),
        )
        .json(&fixtures::create_quiz_request(title))
        .await;
    created.assert_status_ok();
    let body: serde_json::Value = created.json();
    let quiz_id: Uuid = body["quiz_id"].as_str().unwrap().parse().unwrap();

    let details = server
        .put(&format!("/api/quizzes/{}/details", quiz_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(token),
        )
        .json(&fixtures::details_request("", false))
        .await;
    details.assert_status(StatusCode::NO_CONTENT);

    let finished = server
        .post(&format!("/api/quizzes/{}/finish", quiz_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(token),
        )
        .await;
    finished.assert_status_ok();

    quiz_id
}

/// Test practicing records recency, deduplicated and most recent first.
#[tokio::test]
#[ignore = "requires database"]
async fn test_practice_records_recency() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user("practicer").await;

    let first = create_finished_quiz(&server, &token, &fixtures::unique_title("First")).await;
    let second = create_finished_quiz(&server, &token, &fixtures::unique_title("Second")).await;

    // Practice first, then second, then first again.
    for quiz_id in [first, second, first] {
        let response = server
            .post(&format!("/api/practice/{}", quiz_id))
            .add_header(
                axum::http::header::AUTHORIZATION,
                TestContext::auth_header_value(&token),
            )
            .await;
        response.assert_status_ok();
    }

    let recent = server
        .get("/api/practice/recent")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    recent.assert_status_ok();
    let body: serde_json::Value = recent.json();
    let quizzes = body["quizzes"].as_array().unwrap();

    // Both quizzes exactly once, most recently practiced first.
    assert_eq!(quizzes.len(), 2);
    assert_eq!(quizzes[0]["id"], first.to_string());
    assert_eq!(quizzes[1]["id"], second.to_string());

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test practicing an unknown quiz is a 404 and records nothing.
#[tokio::test]
#[ignore = "requires database"]
async fn test_practice_unknown_quiz_not_found() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user("wanderer").await;

    let response = server
        .post(&format!("/api/practice/{}", Uuid::new_v4()))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let recent = server
        .get("/api/practice/recent")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;
    recent.assert_status_ok();
    let body: serde_json::Value = recent.json();
    assert!(body["quizzes"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_user(user_id).await;
}
