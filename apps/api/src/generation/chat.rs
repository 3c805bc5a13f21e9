//! Chat/Rebuild orchestration on top of the generation pipeline.
//!
//! `chat` is a plain conversational turn. `rebuild` folds the user's turns into
//! feedback instructions and runs generation again from the original data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::generation::generator::generate_resume;
use crate::generation::prompts::{
    fill_template, CHAT_PROMPT_TEMPLATE, FEEDBACK_SEPARATOR, MISSING_JOB_DESCRIPTION,
    REBUILD_INSTRUCTIONS_TEMPLATE,
};
use crate::llm_client::prompts::CHAT_SYSTEM;
use crate::llm_client::{LlmError, TextGenerator};
use crate::resume::Resume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    System,
}

impl Sender {
    fn label(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
            Sender::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Chat,
    Rebuild,
}

impl ChatKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "chat" => Some(ChatKind::Chat),
            "rebuild" => Some(ChatKind::Rebuild),
            _ => None,
        }
    }
}

/// One `sender: text` line per message.
pub fn transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|msg| format!("{}: {}", msg.sender.label(), msg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_chat_prompt(
    history: &[ChatMessage],
    current_message: &str,
    resume_data: &Value,
    job_description: Option<&str>,
) -> String {
    let resume_json =
        serde_json::to_string_pretty(resume_data).unwrap_or_else(|_| resume_data.to_string());
    let job_description = job_description
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(MISSING_JOB_DESCRIPTION);

    fill_template(
        CHAT_PROMPT_TEMPLATE,
        &[
            ("resume_data", &resume_json),
            ("job_description", job_description),
            ("history", &transcript(history)),
            ("message", current_message),
        ],
    )
}

/// Answers the latest message. The LLM text is returned verbatim.
pub async fn chat(
    llm: &dyn TextGenerator,
    history: &[ChatMessage],
    current_message: &str,
    resume_data: &Value,
    job_description: Option<&str>,
) -> Result<String, LlmError> {
    info!("Chat turn: history_len={}", history.len());
    let prompt = build_chat_prompt(history, current_message, resume_data, job_description);
    llm.complete(&prompt, CHAT_SYSTEM).await
}

/// User turns joined into the feedback block of a rebuild.
pub fn rebuild_instructions(history: &[ChatMessage]) -> String {
    let feedback = history
        .iter()
        .filter(|msg| msg.sender == Sender::User)
        .map(|msg| msg.text.as_str())
        .collect::<Vec<_>>()
        .join(FEEDBACK_SEPARATOR);
    fill_template(REBUILD_INSTRUCTIONS_TEMPLATE, &[("feedback", &feedback)])
}

/// Regenerates from the original resume data with the conversation as feedback.
pub async fn rebuild(
    llm: &dyn TextGenerator,
    history: &[ChatMessage],
    resume_data: &Value,
    job_description: &str,
) -> Resume {
    let instructions = rebuild_instructions(history);
    info!(
        "Rebuilding resume from {} user turns",
        history.iter().filter(|m| m.sender == Sender::User).count()
    );
    generate_resume(llm, resume_data, job_description, Some(&instructions)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct EchoPrompt {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for EchoPrompt {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    fn msg(sender: Sender, text: &str) -> ChatMessage {
        ChatMessage {
            sender,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_chat_kind_parse() {
        assert_eq!(ChatKind::parse("chat"), Some(ChatKind::Chat));
        assert_eq!(ChatKind::parse("rebuild"), Some(ChatKind::Rebuild));
        assert_eq!(ChatKind::parse("Chat"), None);
    }

    #[test]
    fn test_rebuild_instructions_join_user_turns_only() {
        let history = [
            msg(Sender::User, "Shorter summary"),
            msg(Sender::Ai, "Sure"),
            msg(Sender::System, "Resume rebuilt"),
            msg(Sender::User, "Mention Kubernetes"),
        ];
        assert_eq!(
            rebuild_instructions(&history),
            "Based on the previous resume attempt, apply the following user feedback:\n\
             Feedback: Shorter summary\nFeedback: Mention Kubernetes"
        );
    }

    #[test]
    fn test_sender_deserializes_lowercase() {
        let parsed: ChatMessage =
            serde_json::from_value(json!({ "sender": "ai", "text": "hi" })).unwrap();
        assert_eq!(parsed.sender, Sender::Ai);
        assert!(serde_json::from_value::<ChatMessage>(json!({ "sender": "bot", "text": "" }))
            .is_err());
    }

    #[test]
    fn test_chat_prompt_uses_placeholder_without_jd() {
        let prompt = build_chat_prompt(&[], "Is it good?", &json!({}), None);
        assert!(prompt.contains(MISSING_JOB_DESCRIPTION));
        assert!(prompt.contains("Is it good?"));
    }

    #[test]
    fn test_chat_prompt_keeps_placeholder_text_in_history() {
        let history = [msg(Sender::User, "What goes in {message}?")];
        let prompt = build_chat_prompt(&history, "Latest question", &json!({}), None);
        assert!(prompt.contains("user: What goes in {message}?"));
        assert_eq!(prompt.matches("Latest question").count(), 1);
    }

    #[tokio::test]
    async fn test_chat_returns_llm_text_verbatim() {
        let llm = EchoPrompt {
            reply: "**Looks good.**".to_string(),
            prompts: Mutex::new(Vec::new()),
        };
        let history = [msg(Sender::User, "Hello"), msg(Sender::Ai, "Hi!")];
        let reply = chat(&llm, &history, "Thoughts?", &json!({"name": "Jane"}), Some("Rust role"))
            .await
            .unwrap();
        assert_eq!(reply, "**Looks good.**");
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("user: Hello\nai: Hi!"));
        assert!(prompts[0].contains("Rust role"));
    }

    #[tokio::test]
    async fn test_rebuild_regenerates_from_original_data() {
        let llm = EchoPrompt {
            reply: r#"{"contactInfo": {"name": "Jane Doe"}}"#.to_string(),
            prompts: Mutex::new(Vec::new()),
        };
        let resume = rebuild(
            &llm,
            &[msg(Sender::User, "Add Go")],
            &json!({"rawText": "original data"}),
            "Go role",
        )
        .await;
        assert_eq!(resume.contact_info.name, "Jane Doe");
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("original data"));
        assert!(prompts[0].contains("Feedback: Add Go"));
    }
}
