use std::sync::Arc;

use crate::config::Config;
use crate::intake::job_page::JobPageFetcher;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable text generator. Default: `LlmClient` (disabled without an API key).
    pub llm: Arc<dyn TextGenerator>,
    pub job_pages: JobPageFetcher,
    pub config: Config,
}
