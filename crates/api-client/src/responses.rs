use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The body of `GET /api/healthcheck`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// The body the server returns alongside any non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
}
