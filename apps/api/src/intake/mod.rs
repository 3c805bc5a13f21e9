// Inputs from outside the core pipeline: uploaded resume files and job
// postings fetched by URL. Both reduce to plain text for generation.

pub mod handlers;
pub mod job_page;
pub mod upload;
