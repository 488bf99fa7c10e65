//! User profile endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::gateway::PersistenceGateway;
use crate::models::ProfileResponse;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", auth.user_id)))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        name: user.name,
        quizzes: user.quizzes,
    }))
}
