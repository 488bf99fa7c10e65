//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from quiz-core
pub use quiz_core::{
    HydratedQuiz, Question, QuestionDraft, Quiz, QuizDraft, QuizMetadata, User,
};

// === Database Entity Types ===

/// User account row as stored in PostgreSQL.
///
/// Credentials live only in this type; the shared [`User`] handed to the
/// rest of the system carries id, name and quiz membership.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Bearer-token session row
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Quiz stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct QuizRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author_id: Uuid,
    pub is_public: bool,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizRow {
    /// Convert to the shared quiz type
    pub fn into_quiz(self) -> Quiz {
        Quiz {
            id: self.id,
            title: self.title,
            description: self.description,
            author_id: self.author_id,
            is_public: self.is_public,
            cover_image_url: self.cover_image_url,
        }
    }
}

/// Question stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    pub image_url: Option<String>,
    pub answer: String,
    pub answer_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl QuestionRow {
    /// Convert to the shared question type
    pub fn into_question(self) -> Question {
        Question {
            id: self.id,
            quiz_id: self.quiz_id,
            text: self.text,
            image_url: self.image_url,
            answer: self.answer,
            answer_image_url: self.answer_image_url,
            created_at: self.created_at,
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FederatedRequest {
    pub provider: String,
    pub subject: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct FederatedResponse {
    pub user_id: Uuid,
    pub token: String,
    /// true when this sign-in created the account
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub quizzes: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CreateQuizResponse {
    pub quiz_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateCoverRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CoverResponse {
    pub cover_image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    pub description: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionCountResponse {
    pub question_count: usize,
}

#[derive(Debug, Serialize)]
pub struct QuizListResponse {
    pub quizzes: Vec<HydratedQuiz>,
}

/// Public-listing entry: a hydrated quiz plus its author's display name
#[derive(Debug, Serialize)]
pub struct PublicQuizEntry {
    #[serde(flatten)]
    pub quiz: HydratedQuiz,
    pub author_name: String,
}

#[derive(Debug, Serialize)]
pub struct PublicQuizListResponse {
    pub quizzes: Vec<PublicQuizEntry>,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    /// Short link for the quiz, or null when shortening failed
    pub share_url: Option<String>,
}
