use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;

/// The longest participant name accepted, counted in characters.
pub const MAX_NAME_LEN: usize = 50;

/// One recorded reaction-time trial, as stored in the `reaction_times` table.
/// Attempts are never updated or deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub id: i64,
    pub participant_name: String,
    pub reaction_time_ms: i32,
    pub is_false_start: bool,
    pub created_at: DateTime<Utc>,
}

impl Attempt {
    /// Whether this attempt belongs on a leaderboard whose window starts at `since`.
    /// False starts never qualify.
    pub fn qualifies_since(&self, since: Option<DateTime<Utc>>) -> bool {
        !self.is_false_start && since.is_none_or(|start| self.created_at >= start)
    }
}

/// The canonical leaderboard ordering: fastest first, then oldest first, then
/// lowest id. The same ordering is expressed in SQL by the repository.
pub fn leaderboard_order(a: &Attempt, b: &Attempt) -> Ordering {
    a.reaction_time_ms
        .cmp(&b.reaction_time_ms)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// A leaderboard row. Derived on every query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub participant_name: String,
    pub reaction_time_ms: i32,
    pub created_at: DateTime<Utc>,
    pub rank: u32,
}

impl LeaderboardEntry {
    pub fn from_attempt(attempt: Attempt, rank: u32) -> Self {
        Self {
            id: attempt.id,
            participant_name: attempt.participant_name,
            reaction_time_ms: attempt.reaction_time_ms,
            created_at: attempt.created_at,
            rank,
        }
    }
}

/// The raw body of a submission, before validation.
///
/// `reaction_time_ms` is taken as a JSON number so that fractional or
/// oversized values surface as validation errors rather than decode failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAttemptRequest {
    #[serde(alias = "player_name")]
    pub participant_name: String,
    #[serde(alias = "reaction_time")]
    pub reaction_time_ms: f64,
    pub is_false_start: bool,
}

/// A submission that has passed validation and may be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    participant_name: String,
    reaction_time_ms: i32,
    is_false_start: bool,
}

impl NewAttempt {
    pub fn new(
        participant_name: impl Into<String>,
        reaction_time_ms: i32,
        is_false_start: bool,
    ) -> Result<Self, CoreError> {
        let participant_name = participant_name.into();
        validate_participant_name(&participant_name)?;
        if reaction_time_ms <= 0 {
            return Err(CoreError::NonPositiveReactionTime(reaction_time_ms as f64));
        }
        Ok(Self {
            participant_name,
            reaction_time_ms,
            is_false_start,
        })
    }

    pub fn participant_name(&self) -> &str {
        &self.participant_name
    }

    pub fn reaction_time_ms(&self) -> i32 {
        self.reaction_time_ms
    }

    pub fn is_false_start(&self) -> bool {
        self.is_false_start
    }
}

impl TryFrom<SubmitAttemptRequest> for NewAttempt {
    type Error = CoreError;

    fn try_from(request: SubmitAttemptRequest) -> Result<Self, Self::Error> {
        let ms = request.reaction_time_ms;
        if !ms.is_finite() || ms > i32::MAX as f64 {
            return Err(CoreError::ReactionTimeOutOfRange(ms));
        }
        if ms <= 0.0 {
            return Err(CoreError::NonPositiveReactionTime(ms));
        }
        if ms.fract() != 0.0 {
            return Err(CoreError::FractionalReactionTime(ms));
        }
        NewAttempt::new(request.participant_name, ms as i32, request.is_false_start)
    }
}

/// Checks the participant name contract: 1 to 50 characters, taken verbatim.
/// No trimming or case folding is applied.
pub fn validate_participant_name(name: &str) -> Result<(), CoreError> {
    let len = name.chars().count();
    if len == 0 {
        return Err(CoreError::EmptyName);
    }
    if len > MAX_NAME_LEN {
        return Err(CoreError::NameTooLong {
            max: MAX_NAME_LEN,
            actual: len,
        });
    }
    Ok(())
}
