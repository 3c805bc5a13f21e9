//! Resume Generation: LLM → output parsing → Normalizer.
//!
//! Generation never fails outward. A failed LLM call or unparseable output
//! becomes a fallback `Resume` whose summary explains what went wrong, so the
//! caller can still render something.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generation::prompts::{fill_template, GENERATION_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::TextGenerator;
use crate::resume::{normalize, Resume};

/// Summary of the fallback resume when the LLM answered with something that
/// is not a JSON object.
pub const UNPARSEABLE_OUTPUT_SUMMARY: &str = "Failed to generate summary from LLM.";

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap());

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("LLM output contained no parseable JSON object")]
    NoJsonObject,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Generates a tailored resume from the candidate's data and a job description.
pub async fn generate_resume(
    llm: &dyn TextGenerator,
    resume_data: &Value,
    job_description: &str,
    user_instructions: Option<&str>,
) -> Resume {
    let prompt = build_generation_prompt(resume_data, job_description, user_instructions);
    info!(
        "Generating resume: jd_len={}, has_instructions={}",
        job_description.len(),
        user_instructions.is_some_and(|s| !s.trim().is_empty())
    );

    let text = match llm.complete(&prompt, JSON_ONLY_SYSTEM).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Resume generation call failed: {e}");
            return fallback_resume(format!("Error generating resume: {e}"));
        }
    };

    match parse_generation_output(&text) {
        Ok(value) => normalize(&value),
        Err(e) => {
            warn!("{e}; returning fallback resume");
            debug!("Unparseable LLM output: {text}");
            fallback_resume(UNPARSEABLE_OUTPUT_SUMMARY.to_string())
        }
    }
}

pub fn build_generation_prompt(
    resume_data: &Value,
    job_description: &str,
    user_instructions: Option<&str>,
) -> String {
    let resume_json =
        serde_json::to_string_pretty(resume_data).unwrap_or_else(|_| resume_data.to_string());
    let instructions = match user_instructions.map(str::trim) {
        Some(text) if !text.is_empty() => format!("\nAdditional instructions: {text}"),
        _ => String::new(),
    };

    fill_template(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("resume_data", &resume_json),
            ("job_description", job_description),
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("user_instructions", &instructions),
        ],
    )
}

/// Pulls the resume JSON object out of raw LLM text.
///
/// Tries, in order: the contents of the first markdown code fence (or the whole
/// text when there is none), then every balanced `{...}` block in the text.
pub fn parse_generation_output(text: &str) -> Result<Value, OutputError> {
    let candidate = FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str());

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate.trim()) {
        return Ok(value);
    }

    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(block) = balanced_object(&text[start..]) {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(block) {
                debug!("Recovered JSON object embedded in LLM output");
                return Ok(value);
            }
        }
        search_from = start + 1;
    }

    Err(OutputError::NoJsonObject)
}

/// The `{...}` block starting at the beginning of `text`, if its braces
/// balance. Braces inside JSON strings are ignored.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}

fn fallback_resume(summary: String) -> Resume {
    Resume {
        summary_or_objective: summary,
        ..Resume::default()
    }
}
