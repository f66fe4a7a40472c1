//! Summary generation handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::SummaryTier;

const MISSING_PARAMS: &str = "Missing required parameters";
const MISSING_TEXT: &str = "PDF text not found for this summary. Please upload the book again.";

/// Request body for `POST /generate_summary`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// JSON number or numeric string.
    pub summary_id: Option<Value>,
    pub summary_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub summary: String,
}

/// Requested record id, as given by the client.
#[derive(Debug, PartialEq, Eq)]
enum RequestedId {
    Missing,
    /// Present but cannot name a stored record.
    Invalid,
    Id(i32),
}

fn parse_summary_id(value: Option<&Value>) -> RequestedId {
    let id = match value {
        None | Some(Value::Null) => return RequestedId::Missing,
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) if s.trim().is_empty() => return RequestedId::Missing,
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match id {
        Some(0) => RequestedId::Missing,
        Some(id) => i32::try_from(id)
            .map(RequestedId::Id)
            .unwrap_or(RequestedId::Invalid),
        None => RequestedId::Invalid,
    }
}

/// Generate (or return the stored) summary of one tier for a record.
pub async fn generate_summary(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request(MISSING_PARAMS))?;

    let requested_id = parse_summary_id(request.summary_id.as_ref());
    let summary_type = request.summary_type.unwrap_or_default();
    if requested_id == RequestedId::Missing || summary_type.is_empty() {
        return Err(ApiError::bad_request(MISSING_PARAMS));
    }

    let tier = SummaryTier::from_str(&summary_type).ok_or_else(|| {
        ApiError::bad_request(format!("Invalid summary type: {}", summary_type))
    })?;

    let not_found = || ApiError::NotFound("Summary not found".to_string());
    let RequestedId::Id(id) = requested_id else {
        return Err(not_found());
    };

    let record = state
        .summaries
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to load summary", e))?
        .ok_or_else(not_found)?;

    let Some(text) = record.text() else {
        return Err(ApiError::bad_request(MISSING_TEXT));
    };

    if let Some(existing) = record.summary(tier) {
        tracing::debug!("Returning stored {} summary for {}", tier, id);
        return Ok(respond(existing));
    }

    tracing::info!("Generating {} summary for {} ({})", tier, id, record.display_title());
    let output = state
        .summarizer
        .summarize(text, tier)
        .await
        .map_err(|e| ApiError::internal("Failed to generate summary", e))?;

    if !output.generated {
        return Ok(respond(&output.text));
    }

    let stored = state
        .summaries
        .store_tier_if_empty(id, tier, &output.text)
        .await
        .map_err(|e| ApiError::internal("Failed to generate summary", e))?;
    if stored {
        return Ok(respond(&output.text));
    }

    // Another request stored this tier first; its value wins.
    let current = state
        .summaries
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to generate summary", e))?;
    let summary = current
        .as_ref()
        .and_then(|record| record.summary(tier))
        .unwrap_or(&output.text);
    Ok(respond(summary))
}

fn respond(summary: &str) -> Json<GenerateResponse> {
    Json(GenerateResponse {
        success: true,
        summary: summary.to_string(),
    })
}
