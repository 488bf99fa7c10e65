//! Core quiz domain shared across the workspace.
//!
//! Provides:
//! - Shared types (User, Quiz, Question, authoring drafts, hydrated views)
//! - Authoring input validation
//! - The recently-practiced recency policy

pub mod error;
pub mod recency;
pub mod types;

pub use error::ValidationError;
pub use recency::RecencyList;
pub use types::{
    HydratedQuiz, Question, QuestionDraft, Quiz, QuizDraft, QuizMetadata, User,
};
