//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test users and sessions
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).
//! Media never leaves the process: uploads resolve to stub URLs and the
//! link shortener reports failure, so no S3 or HTTP credentials are
//! needed.

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use clevercards_backend::db::Database;
use clevercards_backend::gateway::{GatewayError, GatewayResult, MediaGateway, PersistenceGateway};
use clevercards_backend::routes;
use clevercards_backend::services::assembly::QuizAssemblyService;
use clevercards_backend::services::media::MediaService;
use clevercards_backend::services::recency::RecencyStore;
use clevercards_backend::AppState;

/// Media double: in-memory upload URLs, no shortener.
#[derive(Default)]
pub struct StubMedia {
    uploads: AtomicUsize,
}

#[async_trait]
impl MediaGateway for StubMedia {
    async fn upload(&self, _bytes: &[u8], folder: &str) -> GatewayResult<String> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://cdn.invalid/{}/{}.jpg", folder, n))
    }

    async fn generate_image(&self, _prompt: &str) -> GatewayResult<std::path::PathBuf> {
        let path = std::env::temp_dir().join(format!("generated_{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, b"png")
            .await
            .map_err(|e| GatewayError::new(e.to_string()))?;
        Ok(path)
    }

    async fn shorten_link(&self, _long_url: &str) -> GatewayResult<String> {
        Err(GatewayError::new("shortener disabled in tests"))
    }
}

/// Test context containing database connection and test server.
///
/// Use this to set up integration tests with a real database connection.
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    pub assembly: Arc<QuizAssemblyService>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        // AppState wants the concrete MediaService; give it dummy config.
        // It is never exercised - the assembly service gets StubMedia and
        // the share route's shortener is unset (share_url: null).
        std::env::set_var("S3_BUCKET", "test-bucket");
        std::env::set_var("S3_ACCESS_KEY", "test-key");
        std::env::set_var("S3_SECRET_KEY", "test-secret");
        std::env::set_var("S3_ENDPOINT", "http://localhost:9000");
        std::env::set_var("S3_PUBLIC_URL", "http://localhost:9000/test-bucket");
        std::env::remove_var("SHORTENER_URL");

        let media = Arc::new(
            MediaService::new()
                .await
                .expect("Failed to create media config"),
        );

        let store: Arc<dyn PersistenceGateway> = db.clone();
        let assembly = Arc::new(QuizAssemblyService::new(
            store,
            Arc::new(StubMedia::default()),
            Duration::from_secs(10),
        ));

        let recency_dir =
            std::env::temp_dir().join(format!("clevercards-recency-{}", Uuid::new_v4()));
        let recency = Arc::new(
            RecencyStore::new(recency_dir, 20).expect("Failed to create recency store"),
        );

        let state = AppState {
            db: db.clone(),
            media,
            assembly: assembly.clone(),
            recency,
            deep_link_base: "https://clevercards.test".to_string(),
        };

        let app = build_test_router(state);

        Self { db, assembly, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user with a session and return its ID and token.
    pub async fn create_test_user(&self, name: &str) -> (Uuid, String) {
        let email = fixtures::unique_email(name);
        let user = self
            .db
            .register_user(&email, name, "hash", "salt")
            .await
            .expect("Failed to create test user");
        let session = self
            .db
            .create_session(user.id)
            .await
            .expect("Failed to create test session");
        (user.id, session.token)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    ///
    /// Call this after tests to remove test data.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        // Delete in order due to foreign keys
        let _ = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query(
            "DELETE FROM questions WHERE quiz_id IN (SELECT id FROM quizzes WHERE author_id = $1)",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await;

        let _ = sqlx::query(
            "DELETE FROM user_quizzes WHERE quiz_id IN (SELECT id FROM quizzes WHERE author_id = $1)",
        )
        .bind(user_id)
        .execute(self.db.pool())
        .await;

        let _ = sqlx::query("DELETE FROM user_quizzes WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM quizzes WHERE author_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Build the test router with all routes.
fn build_test_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/users/me", get(routes::users::me))
        .route("/api/quizzes", post(routes::quizzes::create))
        .route("/api/quizzes/mine", get(routes::quizzes::mine))
        .route("/api/quizzes/public", get(routes::quizzes::public))
        .route("/api/quizzes/{id}", get(routes::quizzes::get))
        .route("/api/quizzes/{id}/link", post(routes::quizzes::link))
        .route("/api/quizzes/{id}/cover", post(routes::quizzes::upload_cover))
        .route(
            "/api/quizzes/{id}/cover/generate",
            post(routes::quizzes::generate_cover),
        )
        .route("/api/quizzes/{id}/details", put(routes::quizzes::details))
        .route(
            "/api/quizzes/{id}/questions",
            post(routes::quizzes::add_question),
        )
        .route("/api/quizzes/{id}/finish", post(routes::quizzes::finish))
        .route("/api/quizzes/{id}/share", post(routes::quizzes::share))
        .route("/api/practice/recent", get(routes::practice::recent))
        .route("/api/practice/{id}", post(routes::practice::practice))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/federated", post(routes::auth::federated))
        .merge(protected_routes)
        .with_state(state)
}
