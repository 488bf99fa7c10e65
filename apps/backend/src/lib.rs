pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::gateway::{MediaGateway, PersistenceGateway};
use crate::services::assembly::QuizAssemblyService;
use crate::services::media::MediaService;
use crate::services::recency::RecencyStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub media: Arc<MediaService>,
    pub assembly: Arc<QuizAssemblyService>,
    pub recency: Arc<RecencyStore>,
    pub deep_link_base: String,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    tracing::info!("Initializing media gateway...");
    let media = MediaService::new().await?;

    let db = Arc::new(db);
    let media = Arc::new(media);

    let timeout_secs = std::env::var("GATEWAY_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let store: Arc<dyn PersistenceGateway> = db.clone();
    let media_gateway: Arc<dyn MediaGateway> = media.clone();
    let assembly = Arc::new(QuizAssemblyService::new(
        store,
        media_gateway,
        Duration::from_secs(timeout_secs),
    ));

    let recency_dir =
        std::env::var("RECENCY_DIR").unwrap_or_else(|_| "./data/recency".to_string());
    let recency = Arc::new(RecencyStore::new(
        recency_dir,
        quiz_core::recency::DEFAULT_CAPACITY,
    )?);

    let deep_link_base = std::env::var("DEEP_LINK_BASE")
        .unwrap_or_else(|_| "https://clevercards.app".to_string());

    let state = AppState {
        db,
        media,
        assembly,
        recency,
        deep_link_base,
    };

    // Build router with protected routes
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Quiz routes
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
        // Practice routes
        .route("/api/practice/recent", get(routes::practice::recent))
        .route("/api/practice/{id}", post(routes::practice::practice))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    // Build full router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/federated", post(routes::auth::federated))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
