use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeaderboardError {
    /// The caller supplied input that violates an operation's contract.
    #[error("Invalid input: {0}")]
    Validation(#[from] core_types::CoreError),

    /// The attempt store failed. No partial result is returned.
    #[error("Storage error: {0}")]
    Storage(#[from] database::DbError),
}
