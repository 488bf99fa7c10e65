//! Core types for the quiz service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Account that authors and saves quizzes.
///
/// Created on first sign-in and never deleted. `quizzes` is an ordered,
/// deduplicated membership list of quiz ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub quizzes: Vec<Uuid>,
}

/// Quiz metadata as stored.
///
/// Questions are never inlined here; they are fetched separately and
/// combined into a [`HydratedQuiz`] for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub author_id: Uuid,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

/// A quiz before the store has assigned it an id.
///
/// There is no id field: a draft that has never been created cannot be
/// referenced, which is exactly the point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDraft {
    pub title: String,
    pub author_id: Uuid,
}

impl QuizDraft {
    /// Check the draft is creatable: non-blank title, real author.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        if self.author_id.is_nil() {
            return Err(ValidationError::MissingAuthor);
        }
        Ok(())
    }
}

/// The updatable subset of quiz metadata.
///
/// `id` and `author_id` are immutable once a quiz exists and so never
/// appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizMetadata {
    pub title: String,
    pub description: String,
    pub is_public: bool,
    pub cover_image_url: Option<String>,
}

/// One flip card. Owned by exactly one quiz, created only by the batch
/// append during authoring, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A question accumulated during authoring, before the batch commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub image_url: Option<String>,
    pub answer: String,
    pub answer_image_url: Option<String>,
}

impl QuestionDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::BlankQuestionText);
        }
        Ok(())
    }
}

/// A quiz combined with its fetched questions.
///
/// This is the only display-ready shape; it is produced exclusively by
/// the hydration path once both the metadata and the question fetch have
/// succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydratedQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

impl HydratedQuiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(title: &str) -> QuizDraft {
        QuizDraft {
            title: title.to_string(),
            author_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn draft_with_title_is_valid() {
        assert_eq!(draft("Capitals of Europe").validate(), Ok(()));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(draft("").validate(), Err(ValidationError::BlankTitle));
        assert_eq!(draft("   ").validate(), Err(ValidationError::BlankTitle));
    }

    #[test]
    fn nil_author_is_rejected() {
        let d = QuizDraft {
            title: "Capitals".to_string(),
            author_id: Uuid::nil(),
        };
        assert_eq!(d.validate(), Err(ValidationError::MissingAuthor));
    }

    #[test]
    fn blank_question_text_is_rejected() {
        let q = QuestionDraft {
            text: " ".to_string(),
            image_url: None,
            answer: "42".to_string(),
            answer_image_url: None,
        };
        assert_eq!(q.validate(), Err(ValidationError::BlankQuestionText));
    }
}
