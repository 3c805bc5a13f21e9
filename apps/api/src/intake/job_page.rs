//! Job description fetch: URL → page HTML → collapsed text.

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Tried in order; the first one with any text wins.
const CONTENT_SELECTORS: [&str; 6] = [
    "article",
    r#"[role="main"]"#,
    "#job-description",
    ".job-description",
    "main",
    "body",
];

/// Elements whose text is never part of a job description.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

static CONTENT: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_SELECTORS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .collect()
});

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Job URL is required.")]
    MissingUrl,

    #[error("Invalid Job URL format provided.")]
    InvalidUrl,

    #[error("Error fetching URL: Server responded with status {0}.")]
    Status(u16),

    #[error("Error fetching URL: The request timed out.")]
    Timeout,

    #[error("Error fetching URL: No response received from the server.")]
    NoResponse,

    #[error("Error fetching URL: {0}")]
    Transport(String),

    #[error(
        "Could not extract job description content from the provided URL. \
         The website structure might be unsupported."
    )]
    NoContent,
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Status(status) if (400..500).contains(&status) => {
                AppError::Validation(e.to_string())
            }
            FetchError::Status(_) | FetchError::Transport(_) => AppError::Upstream(e.to_string()),
            FetchError::Timeout | FetchError::NoResponse => AppError::GatewayTimeout(e.to_string()),
            FetchError::MissingUrl | FetchError::InvalidUrl | FetchError::NoContent => {
                AppError::Validation(e.to_string())
            }
        }
    }
}

/// HTTP client for job postings, with browser-like headers and a hard timeout.
#[derive(Clone)]
pub struct JobPageFetcher {
    client: Client,
}

impl JobPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .default_headers(headers)
                .timeout(timeout)
                .build()?,
        })
    }

    /// Fetches the page and returns its job-description text.
    pub async fn fetch(&self, raw_url: &str) -> Result<String, FetchError> {
        let url = parse_job_url(raw_url)?;
        info!("Fetching job description from {url}");

        let response = self.client.get(url.clone()).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            warn!("Job page {url} responded with {status}");
            return Err(FetchError::Status(status.as_u16()));
        }
        let html = response.text().await.map_err(classify)?;

        let text = extract_job_text(&html);
        if text.is_empty() {
            warn!("No job description content found at {url}");
            return Err(FetchError::NoContent);
        }
        info!("Extracted {} chars of job description from {url}", text.len());
        Ok(text)
    }
}

pub fn parse_job_url(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchError::MissingUrl);
    }
    let url = Url::parse(raw).map_err(|_| FetchError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(FetchError::InvalidUrl),
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() || e.is_request() {
        FetchError::NoResponse
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Text of the first content container that has any, with whitespace runs
/// collapsed to single spaces. Script and style text is ignored.
pub fn extract_job_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    for selector in CONTENT.iter() {
        let text = doc
            .select(selector)
            .map(visible_text)
            .collect::<Vec<_>>()
            .join(" ");
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            return collapsed;
        }
    }
    String::new()
}

fn visible_text(el: ElementRef) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_parse_job_url() {
        assert!(matches!(parse_job_url("   "), Err(FetchError::MissingUrl)));
        assert!(matches!(parse_job_url("not a url"), Err(FetchError::InvalidUrl)));
        assert!(matches!(parse_job_url("ftp://jobs.example.com/1"), Err(FetchError::InvalidUrl)));
        assert!(parse_job_url("https://jobs.example.com/1").is_ok());
    }

    #[test]
    fn test_extract_prefers_article() {
        let html = r#"<html><body><nav>Menu</nav>
            <article><h1>Rust Engineer</h1>
            <p>Build   services.</p></article></body></html>"#;
        assert_eq!(extract_job_text(html), "Rust Engineer Build services.");
    }

    #[test]
    fn test_extract_falls_back_to_body_without_scripts() {
        let html = r#"<html><head><style>p { color: red }</style></head>
            <body><script>var x = 1;</script><p>Apply now</p></body></html>"#;
        assert_eq!(extract_job_text(html), "Apply now");
    }

    #[test]
    fn test_extract_skips_empty_containers() {
        let html = r#"<body><article>   </article><div class="job-description">Go dev</div></body>"#;
        assert_eq!(extract_job_text(html), "Go dev");
    }

    #[test]
    fn test_fetch_error_status_mapping() {
        let status = |e: FetchError| AppError::from(e).into_response().status();
        assert_eq!(status(FetchError::Status(404)), StatusCode::BAD_REQUEST);
        assert_eq!(status(FetchError::Status(503)), StatusCode::BAD_GATEWAY);
        assert_eq!(status(FetchError::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status(FetchError::NoResponse), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status(FetchError::NoContent), StatusCode::BAD_REQUEST);
    }
}
