use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leaderboard::error::LeaderboardError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The request could not be decoded into an operation's input.
    #[error("Malformed request: {0}")]
    Malformed(String),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Client mistakes become 400 with the violated constraint; storage failures
/// become an opaque 500 and are logged here.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Malformed(message) => {
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            AppError::Leaderboard(LeaderboardError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, "validation_error", err.to_string())
            }
            AppError::Leaderboard(LeaderboardError::Storage(db_err)) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal database error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": kind, "message": message }));
        (status, body).into_response()
    }
}
