//! HTML page handlers.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::super::template_structs::{ErrorTemplate, IndexTemplate, RecentRow, SummaryTemplate};
use super::super::AppState;

/// Number of uploads listed on the home page.
const RECENT_LIMIT: i64 = 5;

fn render<T: Template>(template: T) -> Html<String> {
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Render the error page with the given status.
pub(super) fn error_page(status: StatusCode, message: &str) -> Response {
    let template = ErrorTemplate {
        title: status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string(),
        status: status.as_u16(),
        message: message.to_string(),
    };
    (status, render(template)).into_response()
}

/// Home page with the upload form and the most recent uploads.
pub async fn index(State(state): State<AppState>) -> Response {
    let recent = match state.summaries.recent(RECENT_LIMIT).await {
        Ok(recent) => recent,
        Err(e) => {
            tracing::error!("Failed to load recent summaries: {:?}", e);
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load recent uploads.",
            );
        }
    };

    render(IndexTemplate {
        title: "Upload".to_string(),
        recent: recent.iter().map(RecentRow::from).collect(),
        max_upload_mb: state.settings.max_upload_bytes / (1024 * 1024),
    })
    .into_response()
}

/// Detail page for one uploaded book.
pub async fn summary_detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<i32>() else {
        return error_page(StatusCode::NOT_FOUND, "Summary not found.");
    };

    match state.summaries.get(id).await {
        Ok(Some(record)) => render(SummaryTemplate::from_record(&record)).into_response(),
        Ok(None) => error_page(StatusCode::NOT_FOUND, "Summary not found."),
        Err(e) => {
            tracing::error!("Failed to load summary {}: {:?}", id, e);
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load summary.",
            )
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    error_page(StatusCode::NOT_FOUND, "Page not found.")
}
