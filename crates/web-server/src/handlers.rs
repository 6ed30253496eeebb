use crate::{error::AppError, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use core_types::{Attempt, LeaderboardEntry, SubmitAttemptRequest, TimeFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub filter: TimeFilter,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PersonalBestParams {
    #[serde(alias = "player_name")]
    pub participant_name: String,
}

/// # GET /api/healthcheck
/// Liveness only; does not touch the store.
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// # POST /api/reaction-times
/// Records one attempt and returns it with its assigned id and timestamp.
pub async fn submit_reaction_time(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitAttemptRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Attempt>), AppError> {
    let Json(request) = payload?;
    let attempt = state.leaderboard.submit(request).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// # GET /api/leaderboard?filter=today&limit=10
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let Query(params) = params?;
    let entries = state.leaderboard.rank(params.filter, params.limit).await?;
    Ok(Json(entries))
}

/// # GET /api/personal-best?participant_name=Alice
/// Responds with `null` when the participant has no valid attempt.
pub async fn get_personal_best(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PersonalBestParams>, QueryRejection>,
) -> Result<Json<Option<Attempt>>, AppError> {
    let Query(params) = params?;
    let best = state
        .leaderboard
        .personal_best(&params.participant_name)
        .await?;
    Ok(Json(best))
}
