use crate::error::DbError;
use crate::store::AttemptStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{Attempt, NewAttempt};
use sqlx::postgres::PgPool;

/// The `DbRepository` provides the PostgreSQL-backed `AttemptStore`.
/// It encapsulates all SQL queries against the `reaction_times` table.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for DbRepository {
    async fn insert_attempt(&self, attempt: &NewAttempt) -> Result<Attempt, DbError> {
        let saved = sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO reaction_times (participant_name, reaction_time_ms, is_false_start)
            VALUES ($1, $2, $3)
            RETURNING id, participant_name, reaction_time_ms, is_false_start, created_at
            "#,
        )
        .bind(attempt.participant_name())
        .bind(attempt.reaction_time_ms())
        .bind(attempt.is_false_start())
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn fastest_attempts(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Attempt>, DbError> {
        // A NULL lower bound means no time window.
        let attempts = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT id, participant_name, reaction_time_ms, is_false_start, created_at
            FROM reaction_times
            WHERE is_false_start = FALSE
              AND ($1::timestamptz IS NULL OR created_at >= $1)
            ORDER BY reaction_time_ms ASC, created_at ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn personal_best(&self, participant_name: &str) -> Result<Option<Attempt>, DbError> {
        let best = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT id, participant_name, reaction_time_ms, is_false_start, created_at
            FROM reaction_times
            WHERE participant_name = $1 AND is_false_start = FALSE
            ORDER BY reaction_time_ms ASC, created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(participant_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(best)
    }
}
