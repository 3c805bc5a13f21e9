//! Edit session: the client-side state machine that holds one `Resume`
//! while the user edits it, and commits it through a render round trip.
//!
//! `Viewing ⇄ Editing → Saving → Viewing` on success, `Editing` on failure.
//! Edits never reach the backend until a save; a failed save keeps them.
//! The HTTP routes never hold a session; it is exported from the library
//! for clients that drive the edit loop themselves.

pub mod edit;
pub mod validation;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::DownloadTracker;
use crate::resume::{extract, render, Resume};

pub use edit::{apply_edit, Edit, EditError};
use edit::ContactField;
use validation::{check_into, validate_resume, Checked, ValidationErrors};

// ────────────────────────────────────────────────────────────────────────────
// Render backend
// ────────────────────────────────────────────────────────────────────────────

/// The server side of a session: `/api/resume/update` and `/api/resume/parse`.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn render(&self, resume: &Resume) -> Result<String, SaveError>;
    async fn parse(&self, html: &str) -> Result<Resume, SaveError>;
}

/// Runs the template renderer and extractor in-process.
pub struct TemplateBackend;

#[async_trait]
impl RenderBackend for TemplateBackend {
    async fn render(&self, resume: &Resume) -> Result<String, SaveError> {
        render(resume).map_err(|e| SaveError::Backend(e.to_string()))
    }

    async fn parse(&self, html: &str) -> Result<Resume, SaveError> {
        Ok(extract(html))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing,
    Saving,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaveError {
    #[error("Please fix the validation errors before saving.")]
    Invalid(ValidationErrors),

    #[error("A save is already in progress.")]
    InFlight,

    #[error("Save is only available in edit mode.")]
    NotEditing,

    #[error("Failed to save resume: {0}")]
    Backend(String),
}

#[derive(Debug)]
pub struct EditSession {
    html: String,
    resume: Resume,
    errors: ValidationErrors,
    dirty: bool,
    state: SessionState,
    last_error: Option<String>,
    downloads: DownloadTracker,
}

impl EditSession {
    /// Preferred path: the server already returned structured data with the HTML.
    pub fn new(html: String, resume: Resume) -> Self {
        Self {
            html,
            resume,
            errors: ValidationErrors::new(),
            dirty: false,
            state: SessionState::Viewing,
            last_error: None,
            downloads: DownloadTracker::default(),
        }
    }

    /// Degraded path: only HTML is at hand, so the structure is re-extracted.
    pub async fn recover(html: String, backend: &dyn RenderBackend) -> Result<Self, SaveError> {
        warn!("No structured resume data, recovering it from HTML");
        let resume = backend.parse(&html).await?;
        Ok(Self::new(html, resume))
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn resume(&self) -> &Resume {
        &self.resume
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    pub fn enter_editing(&mut self) -> Result<(), EditError> {
        match self.state {
            SessionState::Saving => Err(EditError::SaveInFlight),
            _ => {
                self.state = SessionState::Editing;
                Ok(())
            }
        }
    }

    pub fn leave_editing(&mut self) -> Result<(), EditError> {
        match self.state {
            SessionState::Saving => Err(EditError::SaveInFlight),
            _ => {
                self.state = SessionState::Viewing;
                Ok(())
            }
        }
    }

    /// Applies one edit. `Ok(false)` when the edit was a no-op.
    pub fn apply(&mut self, edit: Edit) -> Result<bool, EditError> {
        match self.state {
            SessionState::Viewing => return Err(EditError::NotEditing),
            SessionState::Saving => return Err(EditError::SaveInFlight),
            SessionState::Editing => {}
        }

        let Some(next) = apply_edit(&self.resume, &edit)? else {
            debug!("Edit was a no-op: {:?}", edit);
            return Ok(false);
        };
        self.resume = next;
        self.dirty = true;

        let checked = match &edit {
            Edit::SetContact { field: ContactField::Name, .. } => Some(Checked::Name),
            Edit::SetContact { field: ContactField::Email, .. } => Some(Checked::Email),
            Edit::SetSummary(_) => Some(Checked::Summary),
            _ => None,
        };
        if let Some(field) = checked {
            check_into(&mut self.errors, field, field.value(&self.resume));
        }
        Ok(true)
    }

    /// Validates everything and moves to `Saving`, handing out the snapshot to render.
    pub fn begin_save(&mut self) -> Result<Resume, SaveError> {
        match self.state {
            SessionState::Saving => return Err(SaveError::InFlight),
            SessionState::Viewing => return Err(SaveError::NotEditing),
            SessionState::Editing => {}
        }

        self.errors = validate_resume(&self.resume);
        if !self.errors.is_empty() {
            return Err(SaveError::Invalid(self.errors.clone()));
        }

        self.state = SessionState::Saving;
        self.last_error = None;
        Ok(self.resume.clone())
    }

    /// Always leaves `Saving`.
    pub fn finish_save(&mut self, outcome: Result<String, SaveError>) {
        match outcome {
            Ok(html) => {
                info!("Saved resume: {} bytes of HTML", html.len());
                self.html = html;
                self.dirty = false;
                self.state = SessionState::Viewing;
            }
            Err(e) => {
                warn!("Save failed, keeping edits: {}", e);
                self.last_error = Some(e.to_string());
                self.state = SessionState::Editing;
            }
        }
    }

    pub async fn save(&mut self, backend: &dyn RenderBackend) -> Result<(), SaveError> {
        let snapshot = self.begin_save()?;
        match backend.render(&snapshot).await {
            Ok(html) => {
                self.finish_save(Ok(html));
                Ok(())
            }
            Err(e) => {
                self.finish_save(Err(e.clone()));
                Err(e)
            }
        }
    }
}
