//! The only place where untyped JSON becomes a [`Resume`].
//!
//! Total: every input (including `null`, arrays, or half-filled objects) yields
//! a fully shaped `Resume`. Idempotent: normalizing the serialized output of a
//! previous normalization returns the same value.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::resume::model::{ContactInfo, Degree, Job, Project, Resume, SkillCategory, Skills};

/// Categories produced when the LLM returns skills as a flat list.
const FLAT_SKILL_CATEGORIES: [&str; 3] = ["technical", "soft", "other"];

pub fn normalize(raw: &Value) -> Resume {
    let Some(obj) = raw.as_object() else {
        if !raw.is_null() {
            warn!("Resume payload is not an object, using defaults");
        }
        return Resume::default();
    };

    for key in [
        "contactInfo",
        "summaryOrObjective",
        "experience",
        "education",
        "skills",
    ] {
        if !obj.contains_key(key) {
            debug!("Resume payload missing '{key}', filling default");
        }
    }

    Resume {
        contact_info: normalize_contact(obj.get("contactInfo")),
        summary_or_objective: scalar(obj.get("summaryOrObjective")),
        experience: objects(obj.get("experience"), "experience")
            .map(|job| Job {
                title: scalar(job.get("title")),
                company: scalar(job.get("company")),
                location: scalar(job.get("location")),
                dates: scalar(job.get("dates")),
                bullets: string_list(job.get("bullets")),
            })
            .collect(),
        education: objects(obj.get("education"), "education")
            .map(|edu| Degree {
                degree: scalar(edu.get("degree")),
                major: scalar(edu.get("major")),
                institution: scalar(edu.get("institution")),
                graduation_year: scalar(edu.get("graduationYear")),
                details: scalar(edu.get("details")),
            })
            .collect(),
        projects: objects(obj.get("projects"), "projects")
            .map(|project| Project {
                name: scalar(project.get("name")),
                description: scalar(project.get("description")),
                bullets: string_list(project.get("bullets")),
            })
            .collect(),
        skills: obj.get("skills").map(normalize_skills).unwrap_or_default(),
        certifications: flattened_list(obj.get("certifications")),
        awards: flattened_list(obj.get("awards")),
        volunteer_work: flattened_list(obj.get("volunteerWork")),
        professional_affiliations: flattened_list(obj.get("professionalAffiliations")),
        languages: flattened_list(obj.get("languages")),
        interests: flattened_list(obj.get("interests")),
    }
}

/// Coerces any skills shape into ordered, uniquely named categories.
///
/// - `["Go", "Rust"]` → `{ technical: [Go, Rust], soft: [], other: [] }`
/// - `{ cat: [..] | "a, b" }` → passed through in key order
/// - anything else → `{}`
pub fn normalize_skills(raw: &Value) -> Skills {
    match raw {
        Value::Array(_) => {
            warn!("Skills is an array, converting to category map");
            let mut flat = Some(string_list(Some(raw)));
            Skills::from_categories(FLAT_SKILL_CATEGORIES.iter().map(|name| SkillCategory {
                category: name.to_string(),
                skills: flat.take().unwrap_or_default(),
            }))
        }
        Value::Object(map) => Skills::from_categories(map.iter().map(|(name, list)| {
            SkillCategory {
                category: name.clone(),
                skills: match list {
                    Value::String(s) => split_comma_list(s),
                    other => string_list(Some(other)),
                },
            }
        })),
        Value::Null => Skills::default(),
        _ => {
            warn!("Skills has unexpected shape, using empty map");
            Skills::default()
        }
    }
}

/// Splits `"Go, Rust, , SQL"` into `["Go", "Rust", "SQL"]`.
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn normalize_contact(raw: Option<&Value>) -> ContactInfo {
    let Some(contact) = raw.and_then(Value::as_object) else {
        return ContactInfo::default();
    };
    ContactInfo {
        name: scalar(contact.get("name")),
        location: scalar(contact.get("location")),
        email: scalar(contact.get("email")),
        phone: scalar(contact.get("phone")),
        linkedin: scalar(contact.get("linkedin")),
    }
}

/// Strings pass through, numbers and booleans are stringified, everything
/// else collapses to `""`.
fn scalar(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn objects<'a>(
    raw: Option<&'a Value>,
    section: &'static str,
) -> impl Iterator<Item = &'a Map<String, Value>> + 'a {
    let items: &[Value] = match raw {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => &[],
        Some(_) => {
            warn!("Section '{section}' is not an array, using empty list");
            &[]
        }
    };
    items.iter().filter_map(Value::as_object)
}

/// Accepts an array (scalars kept, nested values dropped) or a single non-empty string.
fn string_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| matches!(item, Value::String(_) | Value::Number(_) | Value::Bool(_)))
            .map(|item| scalar(Some(item)))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Like [`string_list`], but object items are flattened into one line
/// (`{name, issuer, date}` → `"name, issuer, date"`) and empty lines dropped.
fn flattened_list(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = raw else {
        return string_list(raw);
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(fields) => fields
                .values()
                .map(|v| scalar(Some(v)))
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            other => scalar(Some(other)),
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renormalize(resume: &Resume) -> Resume {
        normalize(&serde_json::to_value(resume).unwrap())
    }

    #[test]
    fn test_empty_object_yields_all_defaults() {
        assert_eq!(normalize(&json!({})), Resume::default());
    }

    #[test]
    fn test_non_object_inputs_yield_defaults() {
        for raw in [json!(null), json!([1, 2]), json!("text"), json!(42)] {
            assert_eq!(normalize(&raw), Resume::default());
        }
    }

    #[test]
    fn test_null_valued_fields_become_defaults() {
        let resume = normalize(&json!({
            "contactInfo": null,
            "summaryOrObjective": null,
            "experience": null,
            "skills": null,
            "languages": null
        }));
        assert_eq!(resume, Resume::default());
    }

    #[test]
    fn test_arrays_in_place_of_objects() {
        let resume = normalize(&json!({
            "contactInfo": ["Jane"],
            "summaryOrObjective": ["nope"],
            "experience": {"title": "Engineer"},
            "education": "MIT"
        }));
        assert_eq!(resume.contact_info, ContactInfo::default());
        assert_eq!(resume.summary_or_objective, "");
        assert!(resume.experience.is_empty());
        assert!(resume.education.is_empty());
    }

    #[test]
    fn test_skills_array_is_wrapped() {
        let resume = normalize(&json!({ "skills": ["Go", "Rust"] }));
        let json = serde_json::to_value(&resume.skills).unwrap();
        assert_eq!(
            json,
            json!({ "technical": ["Go", "Rust"], "soft": [], "other": [] })
        );
    }

    #[test]
    fn test_skills_map_passes_through_in_order() {
        let resume = normalize(&json!({
            "skills": { "Languages": ["Rust"], "Cloud": "AWS, GCP ,", "Tools": 7 }
        }));
        let names: Vec<_> = resume
            .skills
            .categories()
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, ["Languages", "Cloud", "Tools"]);
        assert_eq!(
            resume.skills.get("Cloud"),
            Some(&["AWS".to_string(), "GCP".to_string()][..])
        );
        assert_eq!(resume.skills.get("Tools"), Some(&[][..]));
    }

    #[test]
    fn test_scalars_are_stringified() {
        let resume = normalize(&json!({
            "education": [{ "degree": "BS", "graduationYear": 2021 }]
        }));
        assert_eq!(resume.education[0].graduation_year, "2021");
        assert_eq!(resume.education[0].institution, "");
    }

    #[test]
    fn test_non_object_entries_are_dropped() {
        let resume = normalize(&json!({
            "experience": ["Engineer at Acme", { "title": "Engineer" }, null]
        }));
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].title, "Engineer");
        assert!(resume.experience[0].bullets.is_empty());
    }

    #[test]
    fn test_bullets_accept_single_string() {
        let resume = normalize(&json!({
            "projects": [{ "name": "X", "bullets": "Built it" }]
        }));
        assert_eq!(resume.projects[0].bullets, ["Built it"]);
    }

    #[test]
    fn test_extended_sections_flatten_objects() {
        let resume = normalize(&json!({
            "certifications": [
                { "name": "AWS Solutions Architect", "issuer": "Amazon", "year": 2022 },
                "CKA",
                ""
            ]
        }));
        assert_eq!(
            resume.certifications,
            ["AWS Solutions Architect, Amazon, 2022", "CKA"]
        );
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let resume = normalize(&json!({ "portfolio": "x", "contactInfo": { "github": "y" } }));
        assert_eq!(resume, Resume::default());
    }

    #[test]
    fn test_idempotent_across_shapes() {
        let inputs = [
            json!({}),
            json!(null),
            json!({ "skills": ["Go", "Rust"] }),
            json!({
                "contactInfo": { "name": "Jane", "email": "jane@x.com", "phone": 5551234 },
                "summaryOrObjective": "Builder",
                "experience": [{ "title": "Eng", "bullets": ["a", 1, {"x": 1}] }],
                "education": [{ "degree": "BS", "graduationYear": "Extracted from resume" }],
                "projects": [{ "name": "P", "bullets": "one" }],
                "skills": { "zeta": "a, b", "alpha": ["c"] },
                "awards": [{ "title": "Best", "year": 2020 }],
                "interests": "Chess"
            }),
        ];
        for raw in inputs {
            let once = normalize(&raw);
            assert_eq!(renormalize(&once), once, "not idempotent for {raw}");
        }
    }
}
