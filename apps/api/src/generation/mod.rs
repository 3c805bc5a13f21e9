// Resume generation: prompt → LLM → normalized `Resume`, plus the chat and
// rebuild loop on top of it. All LLM calls go through llm_client.

pub mod chat;
pub mod generator;
pub mod handlers;
pub mod prompts;
