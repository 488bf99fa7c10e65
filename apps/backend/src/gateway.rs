//! Gateway traits for the external services the quiz workflows drive.
//!
//! The assembly service only ever talks to these traits; production
//! implementations live in [`crate::db`] (Postgres) and
//! [`crate::services::media`] (S3 + image generation + shortener), and
//! tests substitute in-memory doubles.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use quiz_core::{Question, QuestionDraft, Quiz, QuizDraft, QuizMetadata, User};

/// Failure from an external collaborator.
///
/// Deliberately coarse: network, store and storage failures collapse into
/// one shape, and nothing is retried automatically. Retrying is a caller
/// action.
#[derive(Debug, Error)]
#[error("gateway failure: {0}")]
pub struct GatewayError(pub String);

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Document-store operations required by the quiz workflows.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert the user document on first sign-in.
    ///
    /// Idempotent: an existing user is left untouched, in particular its
    /// quiz membership list.
    async fn create_user(&self, user: &User) -> GatewayResult<()>;

    async fn get_user(&self, id: Uuid) -> GatewayResult<Option<User>>;

    /// Insert a quiz shell and return its generated id. The stored record
    /// carries the id, so reads are self-describing.
    async fn create_quiz(&self, draft: &QuizDraft) -> GatewayResult<Uuid>;

    /// Partial update of {title, description, is_public, cover_image_url}
    /// only. `id` and `author_id` are immutable.
    async fn update_quiz(&self, id: Uuid, meta: &QuizMetadata) -> GatewayResult<()>;

    async fn get_quiz(&self, id: Uuid) -> GatewayResult<Option<Quiz>>;

    async fn get_public_quizzes(&self) -> GatewayResult<Vec<Quiz>>;

    /// Atomic set-append of `quiz_id` to the user's membership list.
    /// Appending an id that is already present is a no-op.
    async fn append_user_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> GatewayResult<()>;

    /// Write a question batch atomically: all rows or none. An empty
    /// batch succeeds without touching the store.
    async fn add_questions(&self, quiz_id: Uuid, questions: &[QuestionDraft])
        -> GatewayResult<()>;

    /// Questions for a quiz, ordered by question text ascending.
    async fn get_questions(&self, quiz_id: Uuid) -> GatewayResult<Vec<Question>>;
}

/// Blob storage, AI image generation, and link shortening.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Store a blob under a folder-scoped, time-based name and return the
    /// durable download URL.
    async fn upload(&self, bytes: &[u8], folder: &str) -> GatewayResult<String>;

    /// Generate an image from a prompt, download it into the local cache,
    /// and return the cached file handle.
    async fn generate_image(&self, prompt: &str) -> GatewayResult<PathBuf>;

    /// Best-effort short link for a share URL.
    async fn shorten_link(&self, long_url: &str) -> GatewayResult<String>;
}
