use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to reach the leaderboard server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether the server refused the input as invalid.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Server { status: 400, .. })
    }
}
