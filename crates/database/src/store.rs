use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{Attempt, NewAttempt};

/// The typed query interface over the persisted attempts.
///
/// Each method is a single read or a single write against the store; no
/// operation spans more than one statement. Implementations return rows in
/// the canonical leaderboard ordering (see `core_types::leaderboard_order`).
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Appends one attempt and returns it with its assigned `id` and `created_at`.
    async fn insert_attempt(&self, attempt: &NewAttempt) -> Result<Attempt, DbError>;

    /// Fetches at most `limit` non-false-start attempts created at or after
    /// `since` (or at any time when `since` is `None`), fastest first.
    async fn fastest_attempts(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Attempt>, DbError>;

    /// Fetches the fastest non-false-start attempt whose `participant_name`
    /// equals `participant_name` exactly.
    async fn personal_best(&self, participant_name: &str) -> Result<Option<Attempt>, DbError>;
}
