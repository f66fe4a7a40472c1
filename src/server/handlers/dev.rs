//! Development helpers.

use axum::extract::State;
use axum::Json;

use super::super::error::ApiError;
use super::super::AppState;
use super::upload::UploadResponse;

const TEST_FILENAME: &str = "test_book.pdf";
const TEST_TITLE: &str = "Test Book - Atomic Habits";
const TEST_PAGE_COUNT: i32 = 285;

/// Seed a record from the sample text file without uploading a PDF.
pub async fn test_summary(State(state): State<AppState>) -> Result<Json<UploadResponse>, ApiError> {
    let path = &state.settings.sample_text_path;
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::error!("Failed to read sample text {}: {}", path.display(), e);
        ApiError::Internal("Sample text not available".to_string())
    })?;

    let summary_id = state
        .summaries
        .create(TEST_FILENAME, TEST_TITLE, &text, TEST_PAGE_COUNT)
        .await
        .map_err(|e| ApiError::internal("Failed to save test summary", e))?;

    Ok(Json(UploadResponse {
        success: true,
        summary_id,
        title: TEST_TITLE.to_string(),
        page_count: TEST_PAGE_COUNT,
    }))
}
