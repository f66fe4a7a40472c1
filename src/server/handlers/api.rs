//! JSON API handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::SummaryListing;

const DEFAULT_RECENT_LIMIT: i64 = 5;
const MAX_RECENT_LIMIT: i64 = 100;

/// Parameters for recent uploads.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<i64>,
}

/// Most recent uploads, newest first, without extracted text.
pub async fn api_recent(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<SummaryListing>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);

    let records = state
        .summaries
        .recent(limit)
        .await
        .map_err(|e| ApiError::internal("Failed to load recent summaries", e))?;

    Ok(Json(records.iter().map(SummaryListing::from).collect()))
}
