//! PDF upload handler.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use super::super::error::ApiError;
use super::super::AppState;
use crate::utils::{has_pdf_extension, sanitize_filename, title_from_filename};

const NO_TEXT_MESSAGE: &str =
    "Could not extract text from PDF. The file might be encrypted or contain only images.";

/// Response for a newly created record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub summary_id: i32,
    pub title: String,
    pub page_count: i32,
}

/// The `file` part of an upload form.
struct UploadedFile {
    filename: String,
    data: Vec<u8>,
}

async fn read_file_part(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") && file.is_none() {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field.bytes().await?.to_vec();
            file = Some(UploadedFile { filename, data });
        } else {
            // Drain unknown fields
            let _ = field.bytes().await?;
        }
    }

    Ok(file)
}

/// Accept a PDF, extract its text and create a record.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::bad_request("No file part"))?;
    let file = read_file_part(multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("No file part"))?;

    if file.filename.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }
    if !has_pdf_extension(&file.filename) {
        return Err(ApiError::bad_request("Only PDF files are allowed"));
    }

    tracing::info!(
        "Received upload {} ({} bytes)",
        file.filename,
        file.data.len()
    );

    // Removed when dropped, on every return path.
    let temp = tempfile::Builder::new()
        .prefix("booksum-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ApiError::internal("Failed to store upload", e))?;
    tokio::fs::write(temp.path(), &file.data)
        .await
        .map_err(|e| ApiError::internal("Failed to store upload", e))?;

    let extraction = state
        .extractor
        .extract(temp.path())
        .await
        .map_err(|e| ApiError::internal("Failed to read PDF", e))?;

    if extraction.is_blank() {
        tracing::warn!("No text extracted from {}", file.filename);
        return Err(ApiError::bad_request(NO_TEXT_MESSAGE));
    }

    let filename = sanitize_filename(&file.filename);
    let title = title_from_filename(&filename);
    let page_count = i32::try_from(extraction.page_count).unwrap_or(i32::MAX);

    let summary_id = state
        .summaries
        .create(&filename, &title, &extraction.text, page_count)
        .await
        .map_err(|e| ApiError::internal("Failed to save upload", e))?;

    tracing::info!(
        "Created summary {} for {} ({} pages)",
        summary_id,
        filename,
        page_count
    );

    Ok(Json(UploadResponse {
        success: true,
        summary_id,
        title,
        page_count,
    }))
}
