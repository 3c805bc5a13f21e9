//! Tailor: resume tailoring against a job description.

pub mod config;
pub mod errors;
pub mod export;
pub mod generation;
pub mod intake;
pub mod llm_client;
pub mod resume;
pub mod routes;
pub mod session;
pub mod state;

pub use config::Config;
pub use errors::AppError;
