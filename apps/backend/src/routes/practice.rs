//! Practice endpoints: flip-card sessions and recently-practiced history

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{HydratedQuiz, QuizListResponse};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/practice/{id}
/// Records the practice and returns the quiz ready for the flip-card view
pub async fn practice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<HydratedQuiz>> {
    // Only a fully hydrated quiz is practicable.
    let quiz = state.assembly.hydrate(quiz_id).await?;
    state.recency.record_practiced(auth.user_id, quiz_id).await?;

    Ok(Json(quiz))
}

/// GET /api/practice/recent
/// Recently practiced quizzes, most recent first
pub async fn recent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<QuizListResponse>> {
    let ids = state.recency.list_recently_practiced(auth.user_id).await?;
    // Recency order, not title order; entries that no longer hydrate drop out.
    let quizzes = state.assembly.hydrate_ordered(&ids).await;

    Ok(Json(QuizListResponse { quizzes }))
}
