//! Axum route handlers for the Match API.
//!
//! Bodies are taken as raw JSON values and decoded through `models::records`,
//! so an absent record field comes back as `MISSING_FIELD` naming the field.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::features::FeatureRow;
use crate::matching::MatchResult;
use crate::models::{records, JobRecord, TalentRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub talent: TalentRecord,
    pub job: JobRecord,
}

#[derive(Debug, Deserialize)]
pub struct BulkMatchRequest {
    pub talents: Vec<TalentRecord>,
    pub jobs: Vec<JobRecord>,
    /// Keep only the top `limit` results after ranking.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BulkMatchResponse {
    pub results: Vec<MatchResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<MatchResult>, AppError> {
    let request: MatchRequest = records::from_value(body)?;
    let result = state.matcher.match_pair(&request.talent, &request.job)?;
    Ok(Json(result))
}

/// POST /api/v1/match/bulk
///
/// Scores the full talents × jobs cross product on the blocking pool and
/// returns it ranked by descending score.
pub async fn handle_match_bulk(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<BulkMatchResponse>, AppError> {
    let request: BulkMatchRequest = records::from_value(body)?;
    if request.limit == Some(0) {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    let matcher = Arc::clone(&state.matcher);
    let BulkMatchRequest {
        talents,
        jobs,
        limit,
    } = request;
    let mut results = tokio::task::spawn_blocking(move || matcher.match_bulk(&talents, &jobs))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    if let Some(limit) = limit {
        results.truncate(limit);
    }
    Ok(Json(BulkMatchResponse { results }))
}

/// POST /api/v1/features
///
/// Returns the encoded feature row for a pair, keyed by column name.
pub async fn handle_features(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<FeatureRow>, AppError> {
    let request: MatchRequest = records::from_value(body)?;
    let row = state
        .matcher
        .pipeline()
        .features(&request.talent, &request.job)?;
    Ok(Json(row))
}
