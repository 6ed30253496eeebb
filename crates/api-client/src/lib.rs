use crate::error::ApiError;
use async_trait::async_trait;
use core_types::{Attempt, LeaderboardEntry, SubmitAttemptRequest, TimeFilter};
use serde::de::DeserializeOwned;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{ApiErrorResponse, HealthResponse};

/// The abstract interface to the leaderboard server.
/// The game session depends on this trait, so a mock can stand in for the network.
#[async_trait]
pub trait LeaderboardApi: Send + Sync {
    async fn healthcheck(&self) -> Result<HealthResponse, ApiError>;

    async fn submit_reaction_time(
        &self,
        request: &SubmitAttemptRequest,
    ) -> Result<Attempt, ApiError>;

    async fn get_leaderboard(
        &self,
        filter: TimeFilter,
        limit: Option<u32>,
    ) -> Result<Vec<LeaderboardEntry>, ApiError>;

    /// `Ok(None)` when the participant has no valid attempt.
    async fn get_personal_best(
        &self,
        participant_name: &str,
    ) -> Result<Option<Attempt>, ApiError>;
}

/// A concrete implementation of `LeaderboardApi` over HTTP.
#[derive(Clone)]
pub struct HttpLeaderboardClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLeaderboardClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decodes a success body into `T`, or the server's error body into `ApiError::Server`.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            Err(ApiError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl LeaderboardApi for HttpLeaderboardClient {
    async fn healthcheck(&self) -> Result<HealthResponse, ApiError> {
        let response = self.client.get(self.url("/api/healthcheck")).send().await?;
        Self::read_json(response).await
    }

    async fn submit_reaction_time(
        &self,
        request: &SubmitAttemptRequest,
    ) -> Result<Attempt, ApiError> {
        let response = self
            .client
            .post(self.url("/api/reaction-times"))
            .json(request)
            .send()
            .await?;
        let attempt: Attempt = Self::read_json(response).await?;
        tracing::debug!(id = attempt.id, "Reaction time submitted.");
        Ok(attempt)
    }

    async fn get_leaderboard(
        &self,
        filter: TimeFilter,
        limit: Option<u32>,
    ) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let mut query = vec![("filter", filter.as_str().to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let response = self
            .client
            .get(self.url("/api/leaderboard"))
            .query(&query)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn get_personal_best(
        &self,
        participant_name: &str,
    ) -> Result<Option<Attempt>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/personal-best"))
            .query(&[("participant_name", participant_name)])
            .send()
            .await?;
        Self::read_json(response).await
    }
}
