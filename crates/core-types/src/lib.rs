//! # Reflex Core Types
//!
//! The data contracts shared by every other crate: the persisted `Attempt`,
//! the validated `NewAttempt` submission, the derived `LeaderboardEntry`,
//! and the `TimeFilter` windows a leaderboard can be scoped to.
//!
//! As a Layer 0 crate it depends on no other workspace crate.

pub mod attempt;
pub mod error;
pub mod filter;

// Re-export the core types to provide a clean public API.
pub use attempt::{
    leaderboard_order, validate_participant_name, Attempt, LeaderboardEntry, NewAttempt,
    SubmitAttemptRequest, MAX_NAME_LEN,
};
pub use error::CoreError;
pub use filter::TimeFilter;
