pub mod health;
pub mod json;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::generation::handlers as resume;
use crate::intake::handlers as intake;
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/api/health", get(health::health_handler))
        // Intake
        .route(
            "/api/upload/resume",
            post(intake::handle_upload_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/job-description/fetch-from-url",
            post(intake::handle_fetch_job_description),
        )
        // Resume API
        .route("/api/resume/generate", post(resume::handle_generate))
        .route("/api/resume/render", post(resume::handle_render))
        .route("/api/resume/parse", post(resume::handle_parse))
        .route("/api/resume/update", post(resume::handle_update))
        .route("/api/resume/chat", post(resume::handle_chat))
        .route("/api/resume/download", post(resume::handle_download))
        .with_state(state)
}
