//! Resume export: rendered HTML → Markdown / DOCX / PDF bytes.
//!
//! All three formats go through the same [`blocks`] model, so they agree on
//! what text is exported and in which order.

pub mod blocks;
pub mod docx;
pub mod markdown;
pub mod pdf;

use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
    Md,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            "md" => Some(ExportFormat::Md),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Md => "md",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Md => "text/markdown; charset=utf-8",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF conversion failed: {0}")]
    Pdf(String),

    #[error("DOCX conversion failed: {0}")]
    Docx(String),

    #[error("Conversion task failed: {0}")]
    Task(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e.to_string())
    }
}

/// Converts rendered resume HTML to `format`. CPU-bound; callers on the
/// runtime should use [`convert_blocking`].
pub fn convert(html: &str, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let blocks = blocks::html_to_blocks(html);
    debug!("Exporting {} blocks as {}", blocks.len(), format.extension());
    match format {
        ExportFormat::Md => Ok(markdown::to_markdown(&blocks).into_bytes()),
        ExportFormat::Docx => docx::to_docx(&blocks),
        ExportFormat::Pdf => pdf::to_pdf(&blocks),
    }
}

pub async fn convert_blocking(html: String, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let bytes = tokio::task::spawn_blocking(move || convert(&html, format))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;
    info!("Exported {} bytes of {}", bytes.len(), format.extension());
    Ok(bytes)
}

/// `"{name}_{job_title}.{ext}"` reduced to filesystem-safe characters.
///
/// Whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is dropped and
/// trailing `_` are trimmed. An empty stem falls back to `resume`.
pub fn download_filename(name: &str, job_title: Option<&str>, format: ExportFormat) -> String {
    let raw = match job_title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{}_{}", name.trim(), title),
        None => name.trim().to_string(),
    };

    let mut stem = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            stem.push(ch);
        }
    }
    let stem = stem.trim_end_matches('_');
    let stem = if stem.is_empty() { "resume" } else { stem };
    format!("{stem}.{}", format.extension())
}

/// Client-side single-flight guard for downloads: at most one export in
/// flight, and the slot is released on every exit path.
#[derive(Debug, Default)]
pub struct DownloadTracker {
    in_flight: Mutex<Option<ExportFormat>>,
}

/// Holds the download slot; dropping it frees the slot.
#[derive(Debug)]
pub struct DownloadGuard<'a> {
    tracker: &'a DownloadTracker,
}

impl DownloadTracker {
    /// Claims the slot, or returns `None` while another export is running.
    pub fn begin(&self, format: ExportFormat) -> Option<DownloadGuard<'_>> {
        let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return None;
        }
        *slot = Some(format);
        Some(DownloadGuard { tracker: self })
    }

    pub fn in_flight(&self) -> Option<ExportFormat> {
        *self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for DownloadGuard<'_> {
    fn drop(&mut self) {
        *self
            .tracker
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<div class="resume">
        <div class="section contact-info"><h1>Jane Doe</h1>
        <p class="contact-line"><span>NYC</span><span> | <a href="mailto:jane@x.com">jane@x.com</a></span></p></div>
        <div class="section experience"><h2>Professional Experience</h2>
        <div class="job"><h3>Engineer</h3><p class="job-meta">Acme | NYC | 2020-2022</p>
        <ul><li>Shipped X</li></ul></div></div></div>"#;

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("pdf"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("docx"), Some(ExportFormat::Docx));
        assert_eq!(ExportFormat::parse("md"), Some(ExportFormat::Md));
        assert_eq!(ExportFormat::parse("PDF"), None);
        assert_eq!(ExportFormat::parse("txt"), None);
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("Jane Doe", Some("Senior Engineer"), ExportFormat::Pdf),
            "Jane_Doe_Senior_Engineer.pdf"
        );
        assert_eq!(
            download_filename("José  O'Neil", Some("C++ Dev (Remote)"), ExportFormat::Md),
            "Jos_ONeil_C_Dev_Remote.md"
        );
        assert_eq!(download_filename("Jane", Some("  "), ExportFormat::Docx), "Jane.docx");
        assert_eq!(download_filename("", None, ExportFormat::Pdf), "resume.pdf");
        assert_eq!(download_filename("!!!", Some("???"), ExportFormat::Md), "resume.md");
        assert_eq!(download_filename("Jane ", Some("Dev "), ExportFormat::Md), "Jane_Dev.md");
    }

    #[test]
    fn test_convert_all_formats_non_empty() {
        for format in [ExportFormat::Md, ExportFormat::Docx, ExportFormat::Pdf] {
            let bytes = convert(SAMPLE, format).unwrap();
            assert!(!bytes.is_empty(), "{format:?} produced no bytes");
        }
        assert!(convert(SAMPLE, ExportFormat::Pdf).unwrap().starts_with(b"%PDF"));
        assert!(convert(SAMPLE, ExportFormat::Docx).unwrap().starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_convert_blocking_markdown() {
        let bytes = convert_blocking(SAMPLE.to_string(), ExportFormat::Md)
            .await
            .unwrap();
        let md = String::from_utf8(bytes).unwrap();
        assert!(md.starts_with("# Jane Doe"));
        assert!(md.contains("- Shipped X"));
    }

    #[test]
    fn test_download_tracker_single_flight() {
        let tracker = DownloadTracker::default();
        let guard = tracker.begin(ExportFormat::Pdf).unwrap();
        assert_eq!(tracker.in_flight(), Some(ExportFormat::Pdf));
        assert!(tracker.begin(ExportFormat::Md).is_none());
        drop(guard);
        assert_eq!(tracker.in_flight(), None);
        assert!(tracker.begin(ExportFormat::Md).is_some());
    }

    #[test]
    fn test_download_tracker_releases_on_error_path() {
        let tracker = DownloadTracker::default();
        let attempt = || -> Result<(), ExportError> {
            let _guard = tracker.begin(ExportFormat::Docx).unwrap();
            Err(ExportError::Docx("boom".to_string()))
        };
        assert!(attempt().is_err());
        assert_eq!(tracker.in_flight(), None);
    }
}
