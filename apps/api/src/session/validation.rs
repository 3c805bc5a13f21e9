use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::resume::Resume;

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Field-level errors keyed by `"contactInfo.name"`-style paths.
pub type ValidationErrors = BTreeMap<String, String>;

/// The fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checked {
    Name,
    Email,
    Summary,
}

impl Checked {
    pub const ALL: [Checked; 3] = [Checked::Name, Checked::Email, Checked::Summary];

    pub fn key(self) -> &'static str {
        match self {
            Checked::Name => "contactInfo.name",
            Checked::Email => "contactInfo.email",
            Checked::Summary => "summaryOrObjective",
        }
    }

    pub fn value(self, resume: &Resume) -> &str {
        match self {
            Checked::Name => &resume.contact_info.name,
            Checked::Email => &resume.contact_info.email,
            Checked::Summary => &resume.summary_or_objective,
        }
    }
}

/// Validates one field value.
///
/// FAIL conditions:
/// - Empty → [`REQUIRED`]
/// - Email not shaped `local@domain.tld` → [`INVALID_EMAIL`]
pub fn validate_field(field: Checked, value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some(REQUIRED);
    }
    if field == Checked::Email && !EMAIL_RE.is_match(value) {
        return Some(INVALID_EMAIL);
    }
    None
}

/// Records or clears the error for `field` in `errors`. Returns whether the value passed.
pub fn check_into(errors: &mut ValidationErrors, field: Checked, value: &str) -> bool {
    match validate_field(field, value) {
        Some(message) => {
            errors.insert(field.key().to_string(), message.to_string());
            false
        }
        None => {
            errors.remove(field.key());
            true
        }
    }
}

/// Full pass over every checked field.
pub fn validate_resume(resume: &Resume) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in Checked::ALL {
        check_into(&mut errors, field, field.value(resume));
    }
    errors
}
