//! Quiz authoring, browsing and sharing endpoints

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::gateway::{MediaGateway, PersistenceGateway};
use crate::models::{
    CoverResponse, CreateQuizRequest, CreateQuizResponse, DetailsRequest, GenerateCoverRequest,
    HydratedQuiz, PublicQuizEntry, PublicQuizListResponse, QuestionCountResponse,
    QuizListResponse, ShareResponse,
};
use crate::routes::auth::AuthenticatedUser;
use crate::services::assembly::CoverSource;
use crate::AppState;

/// POST /api/quizzes
/// Creates a quiz shell and links it to the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<Json<CreateQuizResponse>> {
    let quiz_id = state.assembly.create_quiz(auth.user_id, &payload.title).await?;
    Ok(Json(CreateQuizResponse { quiz_id }))
}

/// POST /api/quizzes/{id}/link
/// Retry linking after a partial_completion outcome
pub async fn link(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(quiz_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.assembly.link_quiz(auth.user_id, quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/quizzes/{id}/cover
/// Stages an uploaded cover image; raw image bytes as the request body
pub async fn upload_cover(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<CoverResponse>> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Empty image body".to_string()));
    }

    let url = state
        .assembly
        .stage_cover(quiz_id, CoverSource::Upload(body.to_vec()))
        .await?;

    Ok(Json(CoverResponse {
        cover_image_url: url,
    }))
}

/// POST /api/quizzes/{id}/cover/generate
/// Generates a cover image from the quiz title and description
pub async fn generate_cover(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<GenerateCoverRequest>,
) -> Result<Json<CoverResponse>> {
    let url = state
        .assembly
        .stage_cover(
            quiz_id,
            CoverSource::Generate {
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(CoverResponse {
        cover_image_url: url,
    }))
}

/// PUT /api/quizzes/{id}/details
/// Commits description, visibility and any staged cover in one update
pub async fn details(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<DetailsRequest>,
) -> Result<StatusCode> {
    state
        .assembly
        .set_details(quiz_id, payload.description, payload.is_public)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/quizzes/{id}/questions
/// Multipart form: text, answer, optional image and answer_image parts
pub async fn add_question(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<QuestionCountResponse>> {
    let mut text = None;
    let mut answer = None;
    let mut image = None;
    let mut answer_image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("text") => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                )
            }
            Some("answer") => {
                answer = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                )
            }
            Some("image") => {
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?
                        .to_vec(),
                )
            }
            Some("answer_image") => {
                answer_image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?
                        .to_vec(),
                )
            }
            _ => {}
        }
    }

    let text = text.ok_or_else(|| ApiError::BadRequest("Missing text field".to_string()))?;
    let answer = answer.unwrap_or_default();

    let question_count = state
        .assembly
        .add_question(quiz_id, text, answer, image, answer_image)
        .await?;

    Ok(Json(QuestionCountResponse { question_count }))
}

/// POST /api/quizzes/{id}/finish
/// Commits the accumulated question batch and ends the session
pub async fn finish(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuestionCountResponse>> {
    let question_count = state.assembly.finish(quiz_id).await?;
    Ok(Json(QuestionCountResponse { question_count }))
}

/// GET /api/quizzes/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<HydratedQuiz>> {
    Ok(Json(state.assembly.hydrate(quiz_id).await?))
}

/// GET /api/quizzes/mine
pub async fn mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<QuizListResponse>> {
    let quizzes = state.assembly.browse_user(auth.user_id).await?;
    Ok(Json(QuizListResponse { quizzes }))
}

/// GET /api/quizzes/public
pub async fn public(State(state): State<AppState>) -> Result<Json<PublicQuizListResponse>> {
    let quizzes = state.assembly.browse_public().await?;

    let author_ids: Vec<Uuid> = quizzes.iter().map(|quiz| quiz.quiz.author_id).collect();
    let names = state.db.author_names(&author_ids).await?;

    let entries = quizzes
        .into_iter()
        .map(|quiz| {
            let author_name = names
                .get(&quiz.quiz.author_id)
                .cloned()
                .unwrap_or_default();
            PublicQuizEntry { quiz, author_name }
        })
        .collect();

    Ok(Json(PublicQuizListResponse { quizzes: entries }))
}

/// POST /api/quizzes/{id}/share
/// Best-effort short link; share_url is null when shortening fails
pub async fn share(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<ShareResponse>> {
    let quiz = state
        .db
        .get_quiz(quiz_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz {}", quiz_id)))?;

    let long_url = format!(
        "{}/quiz/{}",
        state.deep_link_base.trim_end_matches('/'),
        quiz.id
    );

    let share_url = match state.media.shorten_link(&long_url).await {
        Ok(short) => Some(short),
        Err(err) => {
            tracing::warn!("Link shortening failed for quiz {}: {}", quiz.id, err);
            None
        }
    };

    Ok(Json(ShareResponse { share_url }))
}
