//! Resume upload: raw file bytes → plain text.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;

pub const PDF_MIME: &str = "application/pdf";
pub const TEXT_MIME: &str = "text/plain";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No file uploaded. Expected a multipart field named 'resumeFile'.")]
    MissingFile,

    #[error("File type {0} not yet supported for text extraction.")]
    UnsupportedType(String),

    #[error("File exceeds the upload limit of {0} bytes.")]
    TooLarge(usize),

    #[error("Could not read the uploaded file: {0}")]
    Malformed(String),

    #[error("Error parsing PDF file: {0}")]
    Pdf(String),
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Resolves the effective mime type, falling back to the file extension when
/// the client sent none or a generic one.
pub fn resolve_mime(declared: Option<&str>, filename: &str) -> String {
    let declared = declared
        .map(|m| m.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != "application/octet-stream");
    if let Some(mime) = declared {
        return mime;
    }
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        PDF_MIME.to_string()
    } else if lower.ends_with(".txt") {
        TEXT_MIME.to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

/// Extracts text from a PDF or plain-text upload. PDF parsing runs on the
/// blocking pool.
pub async fn extract_text(bytes: Bytes, mime: &str) -> Result<String, IntakeError> {
    match mime {
        PDF_MIME => {
            let size = bytes.len();
            let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| IntakeError::Pdf(e.to_string()))?
                .map_err(|e| IntakeError::Pdf(e.to_string()))?;
            info!("Extracted {} chars from {size}-byte PDF", text.len());
            Ok(text)
        }
        TEXT_MIME => {
            debug!("Decoding {}-byte text upload", bytes.len());
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        other => Err(IntakeError::UnsupportedType(other.to_string())),
    }
}

/// First `max_chars` characters, with `...` appended when truncated.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
