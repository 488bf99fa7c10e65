//! PostgreSQL database operations
//!
//! `Database` plays two roles: the account/session repository used by the
//! auth layer, and the production [`PersistenceGateway`] consumed by the
//! quiz assembly service.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use quiz_core::{Question, QuestionDraft, Quiz, QuizDraft, QuizMetadata, User};

use crate::error::{ApiError, Result};
use crate::gateway::{GatewayError, GatewayResult, PersistenceGateway};
use crate::models::{QuestionRow, QuizRow, Session, UserRow};

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        GatewayError::new(err.to_string())
    }
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(e.into()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Account Repository ===

    /// Create an email/password account
    pub async fn register_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        password_salt: &str,
    ) -> Result<UserRow> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, password_salt)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, password_salt, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(password_salt)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get account by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, password_salt, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Look up or create a federated account.
    ///
    /// The account is created on the first sign-in with this
    /// provider/subject pair; the returned flag is true for that case.
    pub async fn upsert_federated_user(
        &self,
        provider: &str,
        subject: &str,
        name: &str,
        email: Option<&str>,
    ) -> Result<(UserRow, bool)> {
        let existing = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, password_salt, created_at
            FROM users
            WHERE provider = $1 AND provider_subject = $2
            "#,
        )
        .bind(provider)
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = existing {
            return Ok((user, false));
        }

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, provider, provider_subject)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, password_salt, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(provider)
        .bind(subject)
        .fetch_one(&self.pool)
        .await?;

        Ok((user, true))
    }

    /// Display names for a set of authors
    pub async fn author_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT id, name
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    // === Session Repository ===

    /// Create a session with generated token
    pub async fn create_session(&self, user_id: Uuid) -> Result<Session> {
        let token = Uuid::new_v4().to_string();
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id)
            VALUES ($1, $2)
            RETURNING token, user_id, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Get session by token
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, created_at, last_seen_at
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Update session last_seen_at timestamp
    pub async fn touch_session(&self, token: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET last_seen_at = NOW()
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for Database {
    async fn create_user(&self, user: &User) -> GatewayResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> GatewayResult<Option<User>> {
        let row = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT id, name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, name)) = row else {
            return Ok(None);
        };

        let quizzes: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT quiz_id
            FROM user_quizzes
            WHERE user_id = $1
            ORDER BY added_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(User { id, name, quizzes }))
    }

    async fn create_quiz(&self, draft: &QuizDraft) -> GatewayResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO quizzes (title, author_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(draft.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_quiz(&self, id: Uuid, meta: &QuizMetadata) -> GatewayResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE quizzes
            SET title = $2,
                description = $3,
                is_public = $4,
                cover_image_url = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&meta.title)
        .bind(&meta.description)
        .bind(meta.is_public)
        .bind(&meta.cover_image_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::new(format!("quiz {} does not exist", id)));
        }

        Ok(())
    }

    async fn get_quiz(&self, id: Uuid) -> GatewayResult<Option<Quiz>> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, title, description, author_id, is_public, cover_image_url,
                   created_at, updated_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(QuizRow::into_quiz))
    }

    async fn get_public_quizzes(&self) -> GatewayResult<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, title, description, author_id, is_public, cover_image_url,
                   created_at, updated_at
            FROM quizzes
            WHERE is_public
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuizRow::into_quiz).collect())
    }

    async fn append_user_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> GatewayResult<()> {
        // Server-side set append: concurrent appends cannot lose entries
        // and repeats are no-ops.
        sqlx::query(
            r#"
            INSERT INTO user_quizzes (user_id, quiz_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, quiz_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_questions(
        &self,
        quiz_id: Uuid,
        questions: &[QuestionDraft],
    ) -> GatewayResult<()> {
        if questions.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for question in questions {
            sqlx::query(
                r#"
                INSERT INTO questions (quiz_id, text, image_url, answer, answer_image_url)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(quiz_id)
            .bind(&question.text)
            .bind(&question.image_url)
            .bind(&question.answer)
            .bind(&question.answer_image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn get_questions(&self, quiz_id: Uuid) -> GatewayResult<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, quiz_id, text, image_url, answer, answer_image_url, created_at
            FROM questions
            WHERE quiz_id = $1
            ORDER BY text
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuestionRow::into_question).collect())
    }
}
