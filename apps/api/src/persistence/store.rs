//! Datastore access for letters and usage rows.
//!
//! Tables are provisioned out-of-band (see `schema.sql`); this module only
//! reads and writes rows.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::letter::{LetterRecord, LetterSummary, UsageRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The datastore could not be reached at all.
    #[error("connection error: {0}")]
    Connection(String),

    /// The datastore answered but rejected the statement.
    #[error("query error: {0}")]
    Query(String),
}

impl StoreError {
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Connection(e.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Row-level operations the service needs from its datastore.
#[async_trait]
pub trait LetterStore: Send + Sync {
    /// Cheap round trip proving the datastore and the `letters` table answer.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn insert_letter(&self, record: &LetterRecord) -> Result<(), StoreError>;

    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_letters(&self, limit: i64, offset: i64)
        -> Result<Vec<LetterSummary>, StoreError>;

    async fn count_letters(&self) -> Result<i64, StoreError>;
}

/// PostgreSQL-backed store.
pub struct PgLetterStore {
    pool: PgPool,
}

impl PgLetterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LetterStore for PgLetterStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1 FROM letters LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_letter(&self, record: &LetterRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO letters
                (id, type, title, prompt, form_data, generated_letter,
                 tone, lor_type, strength, word_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(&record.kind)
        .bind(&record.title)
        .bind(&record.prompt)
        .bind(&record.form_data)
        .bind(&record.generated_letter)
        .bind(&record.tone)
        .bind(&record.lor_type)
        .bind(&record.strength)
        .bind(record.word_count)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO api_usage (api_provider, model_used, tokens_used, endpoint, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.api_provider)
        .bind(&record.model_used)
        .bind(record.tokens_used)
        .bind(&record.endpoint)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_letters(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LetterSummary>, StoreError> {
        Ok(sqlx::query_as::<_, LetterSummary>(
            r#"
            SELECT id, type, title, tone, lor_type, strength, word_count, created_at
            FROM letters
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count_letters(&self) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM letters")
            .fetch_one(&self.pool)
            .await?)
    }
}
