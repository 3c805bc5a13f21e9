//! Axum route handlers for resume upload and job description fetch.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::intake::upload::{extract_text, resolve_mime, snippet, IntakeError};
use crate::routes::json::ApiJson;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "resumeFile";
const UPLOAD_SNIPPET_CHARS: usize = 500;
const JOB_SNIPPET_CHARS: usize = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub mimetype: String,
    pub extracted_text: String,
    pub extracted_text_snippet: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchJobRequest {
    #[serde(default)]
    pub job_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchJobResponse {
    pub message: String,
    pub job_url: String,
    pub extracted_description: String,
    pub extracted_description_snippet: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/upload/resume
///
/// Accepts a PDF or plain-text resume in the `resumeFile` multipart field and
/// returns its text.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = state.config.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume").to_string();
        let mimetype = resolve_mime(field.content_type(), &filename);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if bytes.len() > limit {
            return Err(IntakeError::TooLarge(limit).into());
        }
        info!("File received: {filename} ({mimetype}, {} bytes)", bytes.len());

        let extracted_text = extract_text(bytes, &mimetype).await?;
        return Ok(Json(UploadResponse {
            message: "File uploaded and processed successfully.".to_string(),
            extracted_text_snippet: snippet(&extracted_text, UPLOAD_SNIPPET_CHARS),
            filename,
            mimetype,
            extracted_text,
        }));
    }

    Err(IntakeError::MissingFile.into())
}

fn multipart_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IntakeError::TooLarge(limit).into()
    } else {
        IntakeError::Malformed(e.body_text()).into()
    }
}

/// POST /api/job-description/fetch-from-url
///
/// Downloads a job posting and extracts its description text.
pub async fn handle_fetch_job_description(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FetchJobRequest>,
) -> Result<Json<FetchJobResponse>, AppError> {
    let job_url = request.job_url.unwrap_or_default();
    let extracted_description = state.job_pages.fetch(&job_url).await?;

    Ok(Json(FetchJobResponse {
        message: "Job description fetched successfully.".to_string(),
        extracted_description_snippet: snippet(&extracted_description, JOB_SNIPPET_CHARS),
        job_url,
        extracted_description,
    }))
}
