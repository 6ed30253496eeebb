use thiserror::Error;

/// A violated input constraint. Every variant is a client error and is raised
/// before any storage interaction takes place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("participant_name must not be empty")]
    EmptyName,

    #[error("participant_name must be at most {max} characters (got {actual})")]
    NameTooLong { max: usize, actual: usize },

    #[error("reaction_time_ms must be positive (got {0})")]
    NonPositiveReactionTime(f64),

    #[error("reaction_time_ms must be a whole number of milliseconds (got {0})")]
    FractionalReactionTime(f64),

    #[error("reaction_time_ms is out of range (got {0})")]
    ReactionTimeOutOfRange(f64),

    #[error("limit must be a positive integer (got {0})")]
    InvalidLimit(i64),

    #[error("unknown time filter '{0}', expected one of: all_time, today, this_week, this_month")]
    UnknownFilter(String),
}
