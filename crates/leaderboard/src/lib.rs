//! # Reflex Leaderboard
//!
//! The three core operations over the Attempt Store: ranking a time window,
//! looking up a participant's personal best, and recording a new attempt.
//! Each is a single store read or write; the service holds no mutable state.

use crate::error::LeaderboardError;
use chrono::{DateTime, Local, TimeZone};
use configuration::LeaderboardConfig;
use core_types::{
    validate_participant_name, Attempt, CoreError, LeaderboardEntry, NewAttempt,
    SubmitAttemptRequest, TimeFilter,
};
use database::AttemptStore;
use std::sync::Arc;

pub mod error;
pub mod window;

pub use window::window_start;

/// The leaderboard service. Cheap to clone; all clones share one store.
#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn AttemptStore>,
    default_limit: u32,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn AttemptStore>, config: &LeaderboardConfig) -> Self {
        Self {
            store,
            default_limit: config.default_limit,
        }
    }

    /// Ranks the fastest valid attempts in `filter`'s window as of now, in
    /// the server's local time zone.
    pub async fn rank(
        &self,
        filter: TimeFilter,
        limit: Option<i64>,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.rank_at(filter, limit, &Local::now()).await
    }

    /// Ranks the fastest valid attempts in `filter`'s window as of `now`.
    ///
    /// Ranks are positional: the entries are sorted, truncated to `limit`
    /// (the configured default when `None`), and then numbered `1..=n`.
    /// Equal reaction times still receive distinct ranks.
    pub async fn rank_at<Tz: TimeZone>(
        &self,
        filter: TimeFilter,
        limit: Option<i64>,
        now: &DateTime<Tz>,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let limit = limit.unwrap_or(i64::from(self.default_limit));
        if limit <= 0 {
            return Err(CoreError::InvalidLimit(limit).into());
        }

        let since = window_start(filter, now);
        tracing::debug!(%filter, limit, since = ?since, "Ranking attempts.");

        let attempts = self
            .store
            .fastest_attempts(since, limit)
            .await
            .inspect_err(|e| tracing::error!(error = %e, %filter, "Leaderboard query failed."))?;

        Ok(assign_ranks(attempts))
    }

    /// Returns the participant's fastest valid attempt, or `None` when they
    /// have none. The name is matched exactly, with no trimming or case folding.
    pub async fn personal_best(
        &self,
        participant_name: &str,
    ) -> Result<Option<Attempt>, LeaderboardError> {
        validate_participant_name(participant_name)?;

        let best = self
            .store
            .personal_best(participant_name)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Personal best query failed."))?;

        tracing::debug!(
            participant = participant_name,
            found = best.is_some(),
            "Personal best looked up."
        );
        Ok(best)
    }

    /// Validates and records one attempt, returning the stored record.
    /// Nothing is written when validation fails.
    pub async fn submit(&self, request: SubmitAttemptRequest) -> Result<Attempt, LeaderboardError> {
        let attempt = NewAttempt::try_from(request)?;

        let saved = self
            .store
            .insert_attempt(&attempt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Reaction time submission failed."))?;

        tracing::info!(
            id = saved.id,
            participant = %saved.participant_name,
            reaction_time_ms = saved.reaction_time_ms,
            is_false_start = saved.is_false_start,
            "Reaction time recorded."
        );
        Ok(saved)
    }
}

/// Numbers already-sorted attempts by position, starting at 1.
fn assign_ranks(attempts: Vec<Attempt>) -> Vec<LeaderboardEntry> {
    attempts
        .into_iter()
        .zip(1u32..)
        .map(|(attempt, rank)| LeaderboardEntry::from_attempt(attempt, rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};
    use database::{DbError, InMemoryStore};

    fn service(store: Arc<InMemoryStore>) -> Leaderboard {
        Leaderboard::new(store, &LeaderboardConfig::default())
    }

    fn new(name: &str, ms: i32, false_start: bool) -> NewAttempt {
        NewAttempt::new(name, ms, false_start).unwrap()
    }

    fn request(name: &str, ms: f64, false_start: bool) -> SubmitAttemptRequest {
        SubmitAttemptRequest {
            participant_name: name.to_string(),
            reaction_time_ms: ms,
            is_false_start: false_start,
        }
    }

    #[tokio::test]
    async fn ranks_fastest_first_with_positional_ranks() {
        let store = Arc::new(InMemoryStore::new());
        for (name, ms) in [("A", 320), ("B", 180), ("C", 250), ("D", 210)] {
            store.insert_attempt(&new(name, ms, false)).await.unwrap();
        }
        let board = service(store).rank(TimeFilter::AllTime, Some(4)).await.unwrap();

        let times: Vec<i32> = board.iter().map(|e| e.reaction_time_ms).collect();
        assert_eq!(times, vec![180, 210, 250, 320]);
        let ranks: Vec<u32> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn false_starts_are_excluded_however_fast() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_attempt(&new("Cheater", 5, true)).await.unwrap();
        store.insert_attempt(&new("Honest", 240, false)).await.unwrap();
        let board = service(store.clone())
            .rank(TimeFilter::AllTime, None)
            .await
            .unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].participant_name, "Honest");
        // Still retained in the store.
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn limit_truncates_before_ranking() {
        let store = Arc::new(InMemoryStore::new());
        for ms in [400, 300, 200, 100, 500] {
            store.insert_attempt(&new("P", ms, false)).await.unwrap();
        }
        let board = service(store).rank(TimeFilter::AllTime, Some(3)).await.unwrap();
        let summary: Vec<(u32, i32)> = board.iter().map(|e| (e.rank, e.reaction_time_ms)).collect();
        assert_eq!(summary, vec![(1, 100), (2, 200), (3, 300)]);
    }

    #[tokio::test]
    async fn ties_get_distinct_ranks_in_creation_order() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let later = store.insert_at(&new("Later", 200, false), now).await;
        let earlier = store
            .insert_at(&new("Earlier", 200, false), now - Duration::minutes(5))
            .await;
        let board = service(store).rank(TimeFilter::AllTime, Some(1)).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].id, earlier.id);
        assert_ne!(board[0].id, later.id);
    }

    #[tokio::test]
    async fn default_limit_is_applied() {
        let store = Arc::new(InMemoryStore::new());
        for ms in 1..=15 {
            store.insert_attempt(&new("P", ms * 10, false)).await.unwrap();
        }
        let board = service(store).rank(TimeFilter::AllTime, None).await.unwrap();
        assert_eq!(board.len(), 10);
        assert_eq!(board.last().map(|e| e.rank), Some(10));
    }

    #[tokio::test]
    async fn non_positive_limit_is_a_validation_error() {
        let board = service(Arc::new(InMemoryStore::new()));
        for limit in [0, -3] {
            let err = board.rank(TimeFilter::AllTime, Some(limit)).await.unwrap_err();
            assert!(matches!(
                err,
                LeaderboardError::Validation(CoreError::InvalidLimit(l)) if l == limit
            ));
        }
    }

    #[tokio::test]
    async fn time_windows_filter_by_creation_date() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // Wednesday afternoon.
        let now = tz.with_ymd_and_hms(2026, 10, 14, 15, 0, 0).unwrap();
        let at = |d: DateTime<FixedOffset>| d.with_timezone(&Utc);

        let store = Arc::new(InMemoryStore::new());
        let today = store
            .insert_at(
                &new("Today", 300, false),
                at(tz.with_ymd_and_hms(2026, 10, 14, 10, 0, 0).unwrap()),
            )
            .await;
        let yesterday = store
            .insert_at(
                &new("Yesterday", 250, false),
                at(tz.with_ymd_and_hms(2026, 10, 13, 10, 0, 0).unwrap()),
            )
            .await;
        let eight_days_ago = store
            .insert_at(
                &new("EightDays", 200, false),
                at(tz.with_ymd_and_hms(2026, 10, 6, 10, 0, 0).unwrap()),
            )
            .await;
        let last_month = store
            .insert_at(
                &new("LastMonth", 150, false),
                at(tz.with_ymd_and_hms(2026, 9, 20, 10, 0, 0).unwrap()),
            )
            .await;

        let board = service(store);
        let ids = |entries: Vec<LeaderboardEntry>| -> Vec<i64> {
            entries.into_iter().map(|e| e.id).collect()
        };

        let todays = board.rank_at(TimeFilter::Today, Some(10), &now).await.unwrap();
        assert_eq!(ids(todays), vec![today.id]);

        let weeks = board.rank_at(TimeFilter::ThisWeek, Some(10), &now).await.unwrap();
        assert_eq!(ids(weeks), vec![yesterday.id, today.id]);

        let months = board.rank_at(TimeFilter::ThisMonth, Some(10), &now).await.unwrap();
        assert_eq!(ids(months), vec![eight_days_ago.id, yesterday.id, today.id]);

        let all = board.rank_at(TimeFilter::AllTime, Some(10), &now).await.unwrap();
        assert_eq!(
            ids(all),
            vec![last_month.id, eight_days_ago.id, yesterday.id, today.id]
        );
    }

    #[tokio::test]
    async fn empty_store_yields_empty_leaderboard() {
        let board = service(Arc::new(InMemoryStore::new()));
        for filter in TimeFilter::ALL {
            assert!(board.rank(filter, None).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn personal_best_is_the_minimum() {
        let store = Arc::new(InMemoryStore::new());
        for ms in [250, 180, 300] {
            store.insert_attempt(&new("Alice", ms, false)).await.unwrap();
        }
        store.insert_attempt(&new("Alice", 90, true)).await.unwrap();
        store.insert_attempt(&new("Bob", 120, false)).await.unwrap();

        let best = service(store).personal_best("Alice").await.unwrap().unwrap();
        assert_eq!(best.participant_name, "Alice");
        assert_eq!(best.reaction_time_ms, 180);
        assert!(!best.is_false_start);
    }

    #[tokio::test]
    async fn personal_best_absence_is_not_an_error() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_attempt(&new("Jumpy", 100, true)).await.unwrap();
        store.insert_attempt(&new("Jumpy", 110, true)).await.unwrap();
        let board = service(store);

        assert_eq!(board.personal_best("Unknown").await.unwrap(), None);
        assert_eq!(board.personal_best("Jumpy").await.unwrap(), None);
    }

    #[tokio::test]
    async fn personal_best_is_case_sensitive() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_attempt(&new("Alice", 200, false)).await.unwrap();
        let board = service(store);

        assert!(board.personal_best("alice").await.unwrap().is_none());
        assert!(board.personal_best("Alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn personal_best_rejects_invalid_names() {
        let board = service(Arc::new(InMemoryStore::new()));
        assert!(matches!(
            board.personal_best("").await,
            Err(LeaderboardError::Validation(CoreError::EmptyName))
        ));
        assert!(matches!(
            board.personal_best(&"n".repeat(51)).await,
            Err(LeaderboardError::Validation(CoreError::NameTooLong { .. }))
        ));
    }

    #[tokio::test]
    async fn submission_is_visible_to_the_next_ranking() {
        let store = Arc::new(InMemoryStore::new());
        let board = service(store);
        let before = Utc::now();

        let saved = board.submit(request("P", 250.0, false)).await.unwrap();
        assert!(saved.id > 0);
        assert!(saved.created_at >= before);
        assert_eq!(saved.participant_name, "P");
        assert_eq!(saved.reaction_time_ms, 250);

        let ranked = board.rank(TimeFilter::AllTime, Some(10)).await.unwrap();
        assert!(ranked.iter().any(|e| e.id == saved.id));
    }

    #[tokio::test]
    async fn false_start_submissions_are_stored_but_not_ranked() {
        let store = Arc::new(InMemoryStore::new());
        let board = service(store.clone());

        let saved = board.submit(request("P", 120.0, true)).await.unwrap();
        assert!(saved.is_false_start);
        assert_eq!(store.len().await, 1);
        assert!(board.rank(TimeFilter::Today, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_submissions_write_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let board = service(store.clone());

        let empty = board.submit(request("", 250.0, false)).await.unwrap_err();
        assert!(matches!(empty, LeaderboardError::Validation(CoreError::EmptyName)));

        let negative = board.submit(request("P", -5.0, false)).await.unwrap_err();
        assert!(matches!(
            negative,
            LeaderboardError::Validation(CoreError::NonPositiveReactionTime(_))
        ));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let store = Arc::new(InMemoryStore::new());
        store.set_unavailable("connection refused").await;
        let board = service(store);

        assert!(matches!(
            board.rank(TimeFilter::AllTime, None).await,
            Err(LeaderboardError::Storage(DbError::Unavailable(_)))
        ));
        assert!(matches!(
            board.submit(request("P", 250.0, false)).await,
            Err(LeaderboardError::Storage(_))
        ));
    }
}
