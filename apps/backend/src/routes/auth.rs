//! Authentication: registration, login, federated sign-in and middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{
    AuthResponse, FederatedRequest, FederatedResponse, LoginRequest, RegisterRequest,
};
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Salted SHA-256 digest, hex encoded
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// POST /api/auth/register
/// Creates an email/password account and an initial session
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "email",
            message: "email must not be blank".to_string(),
        });
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation {
            field: "password",
            message: "password must not be blank".to_string(),
        });
    }

    if state.db.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::BadRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let salt = Uuid::new_v4().to_string();
    let hash = hash_password(&salt, &payload.password);

    let user = state
        .db
        .register_user(&payload.email, &payload.name, &hash, &salt)
        .await?;
    let session = state.db.create_session(user.id).await?;

    tracing::info!("Registered user {}", user.id);

    Ok(Json(AuthResponse {
        user_id: user.id,
        token: session.token,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .db
        .get_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown email or wrong password".to_string()))?;

    let (Some(hash), Some(salt)) = (&user.password_hash, &user.password_salt) else {
        return Err(ApiError::Unauthorized(
            "Unknown email or wrong password".to_string(),
        ));
    };

    if hash_password(salt, &payload.password) != *hash {
        return Err(ApiError::Unauthorized(
            "Unknown email or wrong password".to_string(),
        ));
    }

    let session = state.db.create_session(user.id).await?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        token: session.token,
    }))
}

/// POST /api/auth/federated
/// Sign in with a federated identity; creates the account on first use
pub async fn federated(
    State(state): State<AppState>,
    Json(payload): Json<FederatedRequest>,
) -> Result<Json<FederatedResponse>> {
    if payload.subject.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "subject",
            message: "federated subject must not be blank".to_string(),
        });
    }

    let (user, created) = state
        .db
        .upsert_federated_user(
            &payload.provider,
            &payload.subject,
            &payload.name,
            payload.email.as_deref(),
        )
        .await?;

    if created {
        tracing::info!("Created user {} on first federated sign-in", user.id);
    }

    let session = state.db.create_session(user.id).await?;

    Ok(Json(FederatedResponse {
        user_id: user.id,
        token: session.token,
        created,
    }))
}

/// Auth middleware - resolves the bearer session token to a user
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    // Skip auth for the sign-in endpoints and health check
    let path = request.uri().path();
    if path.starts_with("/api/auth/") || path == "/health" {
        return Ok(next.run(request).await);
    }

    // Extract Bearer token
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .to_string();

    // Look up the session
    let session = state
        .db
        .get_session(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))?;

    // Update last_seen
    state.db.touch_session(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: session.user_id,
        token,
    });

    Ok(next.run(request).await)
}
