// All LLM prompt templates for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Substitutes `{name}` placeholders in a single pass. Substituted text is
/// never rescanned, and unknown names are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

/// Resume generation prompt. Replace `{resume_data}`, `{job_description}`,
/// `{no_fabrication}` and `{user_instructions}` before sending.
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer. Create a resume tailored to the job description below, using the candidate's existing resume as the only source of facts.

CANDIDATE RESUME:
{resume_data}

JOB DESCRIPTION:
{job_description}

INSTRUCTIONS:
1. Highlight the skills and experience most relevant to this job.
2. Use the job description to decide which qualifications to emphasize.
3. Keep a professional tone and lead bullets with action verbs.
4. Be concise but comprehensive.
5. {no_fabrication}
6. Respond with a single JSON object using exactly this structure:

{
  "contactInfo": {
    "name": "Candidate's full name",
    "location": "City, State",
    "email": "Email address",
    "phone": "Phone number",
    "linkedin": "LinkedIn URL"
  },
  "summaryOrObjective": "A professional summary tailored to the job",
  "experience": [
    {
      "title": "Job Title",
      "company": "Company Name",
      "location": "City, State",
      "dates": "Start Date - End Date",
      "bullets": ["Achievement 1", "Achievement 2"]
    }
  ],
  "education": [
    {
      "degree": "Degree Name",
      "major": "Major",
      "institution": "Institution Name",
      "graduationYear": "Year",
      "details": "Additional details (optional)"
    }
  ],
  "projects": [
    {
      "name": "Project Name",
      "description": "Brief description",
      "bullets": ["Detail 1", "Detail 2"]
    }
  ],
  "skills": {
    "technical": ["Skill 1", "Skill 2"],
    "soft": ["Skill 1", "Skill 2"]
  },
  "certifications": ["Certification 1"],
  "awards": [],
  "volunteerWork": [],
  "professionalAffiliations": [],
  "languages": [],
  "interests": []
}

Respond with ONLY the JSON object, nothing before or after it.
{user_instructions}"#;

/// Chat prompt. Replace `{resume_data}`, `{job_description}`, `{history}` and
/// `{message}` before sending.
pub const CHAT_PROMPT_TEMPLATE: &str = r#"You are helping a user review and refine a resume that was generated from their original resume data for a target job description. Below are the conversation so far and the user's latest message.

ORIGINAL RESUME DATA:
```json
{resume_data}
```

TARGET JOB DESCRIPTION:
```text
{job_description}
```

CHAT HISTORY:
{history}

USER'S LATEST MESSAGE:
{message}

Respond helpfully and concisely. Answer questions about the generated resume, suggest improvements, or acknowledge feedback. Do not regenerate the resume; that is handled by a separate rebuild command. Use markdown (bold, bullet points, headings) where it helps readability."#;

/// Used in the chat prompt when the caller sent no job description text.
pub const MISSING_JOB_DESCRIPTION: &str = "No specific job description text provided.";

/// Prefix for the instructions of a rebuild. Replace `{feedback}`.
pub const REBUILD_INSTRUCTIONS_TEMPLATE: &str =
    "Based on the previous resume attempt, apply the following user feedback:\nFeedback: {feedback}";

/// Separator between user turns when they are folded into rebuild feedback.
pub const FEEDBACK_SEPARATOR: &str = "\nFeedback: ";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_is_single_pass() {
        let filled = fill_template(
            "A={a} B={b}",
            &[("a", "literal {b} here"), ("b", "bee")],
        );
        assert_eq!(filled, "A=literal {b} here B=bee");
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_json_braces() {
        let filled = fill_template("{\n  \"x\": 1 } {other} {a}", &[("a", "1")]);
        assert_eq!(filled, "{\n  \"x\": 1 } {other} 1");
    }
}
