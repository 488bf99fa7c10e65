//! Quiz assembly service: the multi-step authoring and hydration workflows.
//!
//! One authoring session exists per quiz being built, advancing
//! Shell -> Detailed -> Complete. A transition only commits after the
//! gateway call behind it succeeds, so a failure or timeout leaves the
//! session in its prior phase and the caller retries by repeating the
//! action. Sessions are private to this service; the gateways are the
//! only shared state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use uuid::Uuid;

use quiz_core::{HydratedQuiz, QuestionDraft, QuizDraft, QuizMetadata, ValidationError};

use crate::gateway::{GatewayError, GatewayResult, MediaGateway, PersistenceGateway};

/// Bound on every external call issued by this service.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

const COVER_FOLDER: &str = "cover_images";
const QUESTION_FOLDER: &str = "question_images";
const ANSWER_FOLDER: &str = "answer_images";

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("quiz {0} not found")]
    QuizNotFound(Uuid),

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    #[error("no authoring session for quiz {0}")]
    NoSession(Uuid),

    #[error("quiz {0} has no committed details yet")]
    DetailsMissing(Uuid),

    /// The shell exists but could not be added to the author's list.
    /// Callers retry with `link_quiz` instead of recreating the quiz.
    #[error("quiz {quiz_id} was created but not linked to its author")]
    NotLinked { quiz_id: Uuid },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("gateway call {0} timed out")]
    Timeout(&'static str),
}

/// Where a staged cover image comes from.
pub enum CoverSource {
    Upload(Vec<u8>),
    Generate { description: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Shell,
    Detailed,
}

/// Per-quiz authoring state.
struct AuthoringSession {
    title: String,
    phase: Phase,
    staged_cover_url: Option<String>,
    questions: Vec<QuestionDraft>,
}

/// Orchestrates quiz creation, metadata updates, question batches and
/// read-side hydration against injected gateways.
pub struct QuizAssemblyService {
    store: Arc<dyn PersistenceGateway>,
    media: Arc<dyn MediaGateway>,
    call_timeout: Duration,
    sessions: Mutex<HashMap<Uuid, AuthoringSession>>,
}

impl QuizAssemblyService {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        media: Arc<dyn MediaGateway>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            media,
            call_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, AssemblyError>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        bounded(self.call_timeout, op, fut).await
    }

    /// Create a quiz shell and link it to its author.
    ///
    /// Validation happens before any gateway call. Creating and linking
    /// are one logical unit: if the link step fails the shell still
    /// exists and the caller gets [`AssemblyError::NotLinked`] so it can
    /// retry with [`Self::link_quiz`]. The session enters Shell in both
    /// outcomes.
    pub async fn create_quiz(&self, author_id: Uuid, title: &str) -> Result<Uuid, AssemblyError> {
        let draft = QuizDraft {
            title: title.to_string(),
            author_id,
        };
        draft.validate()?;

        let quiz_id = self.call("create_quiz", self.store.create_quiz(&draft)).await?;

        {
            let mut sessions = self.sessions.lock().await;
            sessions.insert(
                quiz_id,
                AuthoringSession {
                    title: draft.title.clone(),
                    phase: Phase::Shell,
                    staged_cover_url: None,
                    questions: Vec::new(),
                },
            );
        }

        match self
            .call("append_user_quiz", self.store.append_user_quiz(author_id, quiz_id))
            .await
        {
            Ok(()) => {
                tracing::info!("Created quiz {} for user {}", quiz_id, author_id);
                Ok(quiz_id)
            }
            Err(err) => {
                tracing::error!("Quiz {} created but not linked: {}", quiz_id, err);
                Err(AssemblyError::NotLinked { quiz_id })
            }
        }
    }

    /// Retry path after a `NotLinked` outcome. Idempotent: the gateway
    /// append is a set operation.
    pub async fn link_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> Result<(), AssemblyError> {
        let quiz = self.call("get_quiz", self.store.get_quiz(quiz_id)).await?;
        if quiz.is_none() {
            return Err(AssemblyError::QuizNotFound(quiz_id));
        }

        self.call("append_user_quiz", self.store.append_user_quiz(user_id, quiz_id))
            .await
    }

    /// Upload (or generate and upload) a cover image and stage its URL
    /// on the session. Nothing is written to the quiz record here; the
    /// staged URL rides along in the next [`Self::set_details`] call.
    pub async fn stage_cover(
        &self,
        quiz_id: Uuid,
        source: CoverSource,
    ) -> Result<String, AssemblyError> {
        let title = self.session_title(quiz_id).await?;

        let bytes = match source {
            CoverSource::Upload(bytes) => bytes,
            CoverSource::Generate { description } => {
                let prompt = format!(
                    "Generate a cover image for a quiz titled: {}. Description: {}",
                    title, description
                );
                let cached = self
                    .call("generate_image", self.media.generate_image(&prompt))
                    .await?;
                tokio::fs::read(&cached).await.map_err(|e| {
                    GatewayError::new(format!("failed to read generated image: {}", e))
                })?
            }
        };

        let url = self.call("upload", self.media.upload(&bytes, COVER_FOLDER)).await?;

        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&quiz_id)
            .ok_or(AssemblyError::NoSession(quiz_id))?;
        session.staged_cover_url = Some(url.clone());

        Ok(url)
    }

    /// Commit description, visibility and any staged cover in a single
    /// update. The session only advances to Detailed after that one
    /// call succeeds, so metadata is never observed partially applied.
    pub async fn set_details(
        &self,
        quiz_id: Uuid,
        description: String,
        is_public: bool,
    ) -> Result<(), AssemblyError> {
        let (title, cover_image_url) = {
            let sessions = self.sessions.lock().await;
            let session = sessions
                .get(&quiz_id)
                .ok_or(AssemblyError::NoSession(quiz_id))?;
            (session.title.clone(), session.staged_cover_url.clone())
        };

        let meta = QuizMetadata {
            title,
            description,
            is_public,
            cover_image_url,
        };

        self.call("update_quiz", self.store.update_quiz(quiz_id, &meta))
            .await?;

        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&quiz_id) {
            session.phase = Phase::Detailed;
        }

        Ok(())
    }

    /// Add one question to the session's pending batch.
    ///
    /// The two image uploads run concurrently and are joined: both must
    /// settle (succeed or be absent) before the question is accepted.
    pub async fn add_question(
        &self,
        quiz_id: Uuid,
        text: String,
        answer: String,
        image: Option<Vec<u8>>,
        answer_image: Option<Vec<u8>>,
    ) -> Result<usize, AssemblyError> {
        if text.trim().is_empty() {
            return Err(ValidationError::BlankQuestionText.into());
        }

        {
            let sessions = self.sessions.lock().await;
            if !sessions.contains_key(&quiz_id) {
                return Err(AssemblyError::NoSession(quiz_id));
            }
        }

        let question_upload = async {
            match &image {
                Some(bytes) => self
                    .call("upload", self.media.upload(bytes, QUESTION_FOLDER))
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let answer_upload = async {
            match &answer_image {
                Some(bytes) => self
                    .call("upload", self.media.upload(bytes, ANSWER_FOLDER))
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (image_url, answer_image_url) = tokio::join!(question_upload, answer_upload);
        let (image_url, answer_image_url) = (image_url?, answer_image_url?);

        let draft = QuestionDraft {
            text,
            image_url,
            answer,
            answer_image_url,
        };

        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&quiz_id)
            .ok_or(AssemblyError::NoSession(quiz_id))?;
        session.questions.push(draft);

        Ok(session.questions.len())
    }

    /// Commit the accumulated questions atomically and end the session.
    ///
    /// Only a Detailed session can finish; the metadata update is a
    /// precondition of the final transition. On failure the pending
    /// list is preserved so the caller can retry without re-entering
    /// anything. Zero questions is a valid completion.
    pub async fn finish(&self, quiz_id: Uuid) -> Result<usize, AssemblyError> {
        let pending = {
            let sessions = self.sessions.lock().await;
            let session = sessions
                .get(&quiz_id)
                .ok_or(AssemblyError::NoSession(quiz_id))?;
            if session.phase != Phase::Detailed {
                return Err(AssemblyError::DetailsMissing(quiz_id));
            }
            session.questions.clone()
        };

        self.call("add_questions", self.store.add_questions(quiz_id, &pending))
            .await?;

        let mut sessions = self.sessions.lock().await;
        sessions.remove(&quiz_id);
        tracing::info!("Quiz {} completed with {} questions", quiz_id, pending.len());

        Ok(pending.len())
    }

    /// Fetch a quiz ready for display: metadata, then questions.
    ///
    /// A quiz whose questions cannot be loaded is an error, never
    /// partial data.
    pub async fn hydrate(&self, quiz_id: Uuid) -> Result<HydratedQuiz, AssemblyError> {
        hydrate_one(self.store.clone(), self.call_timeout, quiz_id).await
    }

    /// Hydrate many quizzes concurrently, preserving input order.
    ///
    /// Each quiz hydrates independently; ones that vanish or fail are
    /// dropped from the result. Returns only after every hydration has
    /// settled.
    pub async fn hydrate_ordered(&self, ids: &[Uuid]) -> Vec<HydratedQuiz> {
        let mut set = JoinSet::new();
        for (index, id) in ids.iter().enumerate() {
            let store = self.store.clone();
            let timeout = self.call_timeout;
            let id = *id;
            set.spawn(async move { (index, hydrate_one(store, timeout, id).await) });
        }

        let mut settled: Vec<Option<HydratedQuiz>> = (0..ids.len()).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            if let Ok((index, result)) = joined {
                match result {
                    Ok(quiz) => settled[index] = Some(quiz),
                    Err(err) => {
                        tracing::warn!("Dropping quiz from list, hydration failed: {}", err)
                    }
                }
            }
        }

        settled.into_iter().flatten().collect()
    }

    /// Hydrated list in display order: sorted by title once every
    /// member has settled.
    pub async fn hydrate_sorted(&self, ids: &[Uuid]) -> Vec<HydratedQuiz> {
        let mut quizzes = self.hydrate_ordered(ids).await;
        quizzes.sort_by(|a, b| a.quiz.title.cmp(&b.quiz.title));
        quizzes
    }

    /// All quizzes on the user's membership list, hydrated and title-sorted.
    pub async fn browse_user(&self, user_id: Uuid) -> Result<Vec<HydratedQuiz>, AssemblyError> {
        let user = self
            .call("get_user", self.store.get_user(user_id))
            .await?
            .ok_or(AssemblyError::UserNotFound(user_id))?;

        Ok(self.hydrate_sorted(&user.quizzes).await)
    }

    /// All public quizzes, hydrated and title-sorted.
    pub async fn browse_public(&self) -> Result<Vec<HydratedQuiz>, AssemblyError> {
        let listed = self
            .call("get_public_quizzes", self.store.get_public_quizzes())
            .await?;
        let ids: Vec<Uuid> = listed.iter().map(|quiz| quiz.id).collect();

        Ok(self.hydrate_sorted(&ids).await)
    }

    async fn session_title(&self, quiz_id: Uuid) -> Result<String, AssemblyError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&quiz_id)
            .map(|session| session.title.clone())
            .ok_or(AssemblyError::NoSession(quiz_id))
    }
}

// Metadata first, then questions: a true dependency, not parallelizable.
async fn hydrate_one(
    store: Arc<dyn PersistenceGateway>,
    timeout: Duration,
    quiz_id: Uuid,
) -> Result<HydratedQuiz, AssemblyError> {
    let quiz = bounded(timeout, "get_quiz", store.get_quiz(quiz_id))
        .await?
        .ok_or(AssemblyError::QuizNotFound(quiz_id))?;
    let questions = bounded(timeout, "get_questions", store.get_questions(quiz_id)).await?;

    Ok(HydratedQuiz { quiz, questions })
}

async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T, AssemblyError>
where
    F: Future<Output = GatewayResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AssemblyError::Gateway(err)),
        Err(_) => Err(AssemblyError::Timeout(op)),
    }
}
