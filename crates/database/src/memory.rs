use crate::error::DbError;
use crate::store::AttemptStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{leaderboard_order, Attempt, NewAttempt};
use tokio::sync::RwLock;

/// A process-local `AttemptStore`. Nothing survives a restart.
///
/// Used by the `memory` storage backend and throughout the test suites.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    attempts: Vec<Attempt>,
    next_id: i64,
    unavailable: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attempt with a caller-chosen `created_at`, for seeding
    /// histories that span several days.
    pub async fn insert_at(&self, attempt: &NewAttempt, created_at: DateTime<Utc>) -> Attempt {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let saved = Attempt {
            id: inner.next_id,
            participant_name: attempt.participant_name().to_string(),
            reaction_time_ms: attempt.reaction_time_ms(),
            is_false_start: attempt.is_false_start(),
            created_at,
        };
        inner.attempts.push(saved.clone());
        saved
    }

    /// Number of stored attempts, false starts included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.attempts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Makes every subsequent operation fail as if the store were unreachable.
    pub async fn set_unavailable(&self, reason: impl Into<String>) {
        self.inner.write().await.unavailable = Some(reason.into());
    }

    fn check_available(inner: &Inner) -> Result<(), DbError> {
        match &inner.unavailable {
            Some(reason) => Err(DbError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AttemptStore for InMemoryStore {
    async fn insert_attempt(&self, attempt: &NewAttempt) -> Result<Attempt, DbError> {
        Self::check_available(&*self.inner.read().await)?;
        Ok(self.insert_at(attempt, Utc::now()).await)
    }

    async fn fastest_attempts(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Attempt>, DbError> {
        let inner = self.inner.read().await;
        Self::check_available(&inner)?;

        let mut qualifying: Vec<Attempt> = inner
            .attempts
            .iter()
            .filter(|a| a.qualifies_since(since))
            .cloned()
            .collect();
        qualifying.sort_by(leaderboard_order);
        qualifying.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(qualifying)
    }

    async fn personal_best(&self, participant_name: &str) -> Result<Option<Attempt>, DbError> {
        let inner = self.inner.read().await;
        Self::check_available(&inner)?;

        Ok(inner
            .attempts
            .iter()
            .filter(|a| a.participant_name == participant_name && !a.is_false_start)
            .min_by(|a, b| leaderboard_order(a, b))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new(name: &str, ms: i32, false_start: bool) -> NewAttempt {
        NewAttempt::new(name, ms, false_start).unwrap()
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let a = store.insert_attempt(&new("A", 200, false)).await.unwrap();
        let b = store.insert_attempt(&new("B", 100, false)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn fastest_attempts_filters_sorts_and_limits() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store.insert_at(&new("A", 300, false), now).await;
        store.insert_at(&new("B", 100, true), now).await;
        store.insert_at(&new("C", 200, false), now - Duration::days(3)).await;
        store.insert_at(&new("D", 150, false), now).await;

        let all = store.fastest_attempts(None, 10).await.unwrap();
        let names: Vec<&str> = all.iter().map(|a| a.participant_name.as_str()).collect();
        assert_eq!(names, vec!["D", "C", "A"]);

        let recent = store
            .fastest_attempts(Some(now - Duration::days(1)), 10)
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);

        let top = store.fastest_attempts(None, 1).await.unwrap();
        assert_eq!(top[0].participant_name, "D");
    }

    #[tokio::test]
    async fn personal_best_is_exact_match() {
        let store = InMemoryStore::new();
        store.insert_attempt(&new("Alice", 250, false)).await.unwrap();
        store.insert_attempt(&new("Alice", 90, true)).await.unwrap();
        store.insert_attempt(&new("Alice", 180, false)).await.unwrap();

        let best = store.personal_best("Alice").await.unwrap().unwrap();
        assert_eq!(best.reaction_time_ms, 180);
        assert!(store.personal_best("alice").await.unwrap().is_none());
        assert!(store.personal_best("Alice ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = InMemoryStore::new();
        store.set_unavailable("connection refused").await;
        assert!(matches!(
            store.insert_attempt(&new("A", 1, false)).await,
            Err(DbError::Unavailable(_))
        ));
        assert!(store.fastest_attempts(None, 10).await.is_err());
        assert!(store.personal_best("A").await.is_err());
        assert!(store.is_empty().await);
    }
}
