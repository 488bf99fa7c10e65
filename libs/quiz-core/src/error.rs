//! Error types for quiz-core.

use thiserror::Error;

/// Errors raised while validating authoring input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("quiz title must not be blank")]
    BlankTitle,

    #[error("question text must not be blank")]
    BlankQuestionText,

    #[error("no authenticated user")]
    MissingAuthor,
}

impl ValidationError {
    /// The input field the error refers to, for inline form display.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTitle => "title",
            Self::BlankQuestionText => "text",
            Self::MissingAuthor => "author",
        }
    }
}
