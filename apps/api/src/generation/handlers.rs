//! Axum route handlers for the Resume API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::export::{convert_blocking, download_filename, ExportFormat};
use crate::generation::chat::{chat, rebuild, ChatKind, ChatMessage};
use crate::generation::generator::generate_resume;
use crate::resume::{extract, render, render_envelope, RenderError, Resume};
use crate::routes::json::ApiJson;
use crate::state::AppState;

const DEFAULT_TEMPLATE: &str = "default";
const REBUILD_MESSAGE: &str = "Resume rebuilt successfully based on feedback.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResumeInput {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct JobDescriptionInput {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub resume_input: Option<ResumeInput>,
    #[serde(default)]
    pub job_description: Option<JobDescriptionInput>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub user_instructions: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub generated_html: String,
    pub resume_data: Resume,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    #[serde(default)]
    pub html_content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub resume_data: Resume,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub resume_data: Option<Resume>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub updated_html: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub chat_history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub current_message: Option<String>,
    #[serde(default)]
    pub original_resume_data: Option<Value>,
    #[serde(default)]
    pub job_description_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildResponse {
    pub message: String,
    pub updated_html: String,
    pub resume_data: Resume,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Reply(ChatReply),
    Rebuilt(RebuildResponse),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/resume/generate
///
/// LLM generation → normalize → render. Always returns the structured data
/// alongside the HTML so the client never has to re-extract it.
pub async fn handle_generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let resume_input = request
        .resume_input
        .filter(|input| present(input.data.as_ref()))
        .ok_or_else(|| AppError::Validation("Missing resume input data.".to_string()))?;
    let job_description = request
        .job_description
        .and_then(|jd| jd.text)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| AppError::Validation("Missing job description text.".to_string()))?;

    if let Some(template_id) = request.template_id.filter(|id| !id.is_empty()) {
        if template_id != DEFAULT_TEMPLATE {
            return Err(AppError::NotFound(format!("Template '{template_id}' not found.")));
        }
    }

    info!(
        "Generate request: source={}, jd_len={}",
        resume_input.source.as_deref().unwrap_or("unknown"),
        job_description.len()
    );

    let data = resume_input.data.unwrap_or_default();
    let resume = generate_resume(
        state.llm.as_ref(),
        &data,
        &job_description,
        request.user_instructions.as_deref(),
    )
    .await;
    let generated_html = render(&resume)?;

    Ok(Json(GenerateResponse {
        generated_html,
        resume_data: resume,
    }))
}

/// POST /api/resume/render
///
/// Renders a `{ generatedSections }` envelope.
pub async fn handle_render(
    ApiJson(envelope): ApiJson<Value>,
) -> Result<Json<RenderResponse>, AppError> {
    let html = render_envelope(&envelope).map_err(|e| match e {
        RenderError::MissingSections => AppError::Validation(e.to_string()),
        e => AppError::Render(e),
    })?;
    Ok(Json(RenderResponse { html }))
}

/// POST /api/resume/parse
///
/// Best-effort HTML → structured data, for clients that lost the structure.
pub async fn handle_parse(
    ApiJson(request): ApiJson<ParseRequest>,
) -> Result<Json<ParseResponse>, AppError> {
    let html = request
        .html_content
        .ok_or_else(|| AppError::Validation("Missing HTML content.".to_string()))?;
    Ok(Json(ParseResponse {
        resume_data: extract(&html),
    }))
}

/// POST /api/resume/update
///
/// Full re-render of edited structured data.
pub async fn handle_update(
    ApiJson(request): ApiJson<UpdateRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    let resume = request
        .resume_data
        .ok_or_else(|| AppError::Validation("Missing resume data.".to_string()))?;
    let updated_html = render(&resume)?;
    Ok(Json(UpdateResponse { updated_html }))
}

/// POST /api/resume/chat
///
/// `type: "chat"` answers a question; `type: "rebuild"` regenerates the resume
/// with the user's chat turns as feedback.
pub async fn handle_chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let kind = request
        .kind
        .as_deref()
        .and_then(ChatKind::parse)
        .ok_or_else(|| AppError::Validation("Invalid request type.".to_string()))?;
    let history = request
        .chat_history
        .ok_or_else(|| AppError::Validation("Missing or invalid chat history.".to_string()))?;
    let current_message = match (kind, request.current_message) {
        (ChatKind::Chat, None) => {
            return Err(AppError::Validation(
                "Missing current message for chat request.".to_string(),
            ))
        }
        (_, message) => message.unwrap_or_default(),
    };
    let (resume_data, job_data) = match (request.original_resume_data, request.job_description_data) {
        (Some(resume), Some(job)) if present(Some(&resume)) && present(Some(&job)) => (resume, job),
        _ => {
            return Err(AppError::Validation(
                "Missing original resume or job description data for context.".to_string(),
            ))
        }
    };
    let job_description = job_description_text(&job_data);

    match kind {
        ChatKind::Chat => {
            let response = chat(
                state.llm.as_ref(),
                &history,
                &current_message,
                &resume_data,
                Some(job_description),
            )
            .await?;
            Ok(Json(ChatResponse::Reply(ChatReply { response })))
        }
        ChatKind::Rebuild => {
            let resume = rebuild(state.llm.as_ref(), &history, &resume_data, job_description).await;
            let updated_html = render(&resume)?;
            Ok(Json(ChatResponse::Rebuilt(RebuildResponse {
                message: REBUILD_MESSAGE.to_string(),
                updated_html,
                resume_data: resume,
            })))
        }
    }
}

/// POST /api/resume/download
///
/// Converts rendered HTML to PDF, DOCX or Markdown and returns it as an attachment.
pub async fn handle_download(
    ApiJson(request): ApiJson<DownloadRequest>,
) -> Result<Response, AppError> {
    let html = request
        .html_content
        .filter(|html| !html.is_empty())
        .ok_or_else(|| AppError::Validation("Missing HTML content for download.".to_string()))?;
    let format = request
        .format
        .as_deref()
        .and_then(ExportFormat::parse)
        .ok_or_else(|| AppError::Validation("Invalid or missing download format.".to_string()))?;

    let name = extract(&html).contact_info.name;
    let filename = download_filename(&name, request.job_title.as_deref(), format);
    let bytes = convert_blocking(html, format).await?;

    info!("Download ready: {filename}");
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Null, `""`, `{}` and `[]` all count as missing.
fn present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Job description data arrives either as `{ text }` or as a bare string.
fn job_description_text(data: &Value) -> &str {
    match data {
        Value::String(text) => text.as_str(),
        Value::Object(map) => map.get("text").and_then(Value::as_str).unwrap_or_default(),
        _ => "",
    }
}
