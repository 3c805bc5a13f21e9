//! Canonical resume schema.
//!
//! Every inbound `Resume`-shaped JSON value is deserialized through
//! [`normalize`](crate::resume::normalize::normalize), so a `Resume` is always
//! fully shaped: no missing keys, no nulls, unique skill categories.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::resume::normalize::normalize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct Resume {
    pub contact_info: ContactInfo,
    pub summary_or_objective: String,
    pub experience: Vec<Job>,
    pub education: Vec<Degree>,
    pub projects: Vec<Project>,
    pub skills: Skills,
    pub certifications: Vec<String>,
    pub awards: Vec<String>,
    pub volunteer_work: Vec<String>,
    pub professional_affiliations: Vec<String>,
    pub languages: Vec<String>,
    pub interests: Vec<String>,
}

impl From<Value> for Resume {
    fn from(raw: Value) -> Self {
        normalize(&raw)
    }
}

impl Resume {
    /// Extended sections in render order, paired with their heading.
    pub fn extended_sections(&self) -> [(Section, &[String]); 6] {
        [
            (Section::Certifications, self.certifications.as_slice()),
            (Section::Awards, self.awards.as_slice()),
            (Section::VolunteerWork, self.volunteer_work.as_slice()),
            (Section::ProfessionalAffiliations, self.professional_affiliations.as_slice()),
            (Section::Languages, self.languages.as_slice()),
            (Section::Interests, self.interests.as_slice()),
        ]
    }

    pub fn extended_section_mut(&mut self, section: Section) -> Option<&mut Vec<String>> {
        match section {
            Section::Certifications => Some(&mut self.certifications),
            Section::Awards => Some(&mut self.awards),
            Section::VolunteerWork => Some(&mut self.volunteer_work),
            Section::ProfessionalAffiliations => Some(&mut self.professional_affiliations),
            Section::Languages => Some(&mut self.languages),
            Section::Interests => Some(&mut self.interests),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
    pub dates: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degree {
    pub degree: String,
    pub major: String,
    pub institution: String,
    pub graduation_year: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub bullets: Vec<String>,
}

/// One named group of skills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillCategory {
    pub category: String,
    pub skills: Vec<String>,
}

/// Ordered skill categories.
///
/// Serialized as a JSON object whose key order follows the category order, so
/// renaming a category never moves it. Category names are unique; the
/// constructors below keep the first occurrence of a duplicated name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct Skills(Vec<SkillCategory>);

impl Skills {
    pub fn from_categories(categories: impl IntoIterator<Item = SkillCategory>) -> Self {
        let mut skills = Skills::default();
        for category in categories {
            if !skills.contains(&category.category) {
                skills.0.push(category);
            }
        }
        skills
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn categories(&self) -> &[SkillCategory] {
        &self.0
    }

    pub fn contains(&self, category: &str) -> bool {
        self.position(category).is_some()
    }

    pub fn position(&self, category: &str) -> Option<usize> {
        self.0.iter().position(|c| c.category == category)
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.skills.as_slice())
    }

    /// Appends a category. Returns `false` (and changes nothing) if the name is taken.
    pub fn push(&mut self, category: SkillCategory) -> bool {
        if self.contains(&category.category) {
            return false;
        }
        self.0.push(category);
        true
    }

    pub fn set(&mut self, category: &str, skills: Vec<String>) -> bool {
        match self.0.iter_mut().find(|c| c.category == category) {
            Some(entry) => {
                entry.skills = skills;
                true
            }
            None => false,
        }
    }

    /// Renames in place. Fails when `from` is missing or `to` is already used
    /// by another category.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from != to && self.contains(to) {
            return false;
        }
        match self.0.iter_mut().find(|c| c.category == from) {
            Some(entry) => {
                entry.category = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, category: &str) -> Option<SkillCategory> {
        self.position(category).map(|idx| self.0.remove(idx))
    }
}

impl From<Value> for Skills {
    fn from(raw: Value) -> Self {
        crate::resume::normalize::normalize_skills(&raw)
    }
}

impl Serialize for Skills {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.category, &entry.skills)?;
        }
        map.end()
    }
}

/// Rendered sections and their exact heading text. The headings double as
/// extraction landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    Experience,
    Education,
    Projects,
    Skills,
    Certifications,
    Awards,
    VolunteerWork,
    ProfessionalAffiliations,
    Languages,
    Interests,
}

impl Section {
    pub const ALL: [Section; 11] = [
        Section::Summary,
        Section::Experience,
        Section::Education,
        Section::Projects,
        Section::Skills,
        Section::Certifications,
        Section::Awards,
        Section::VolunteerWork,
        Section::ProfessionalAffiliations,
        Section::Languages,
        Section::Interests,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Section::Summary => "Summary / Objective",
            Section::Experience => "Professional Experience",
            Section::Education => "Education",
            Section::Projects => "Projects",
            Section::Skills => "Skills",
            Section::Certifications => "Certifications",
            Section::Awards => "Awards",
            Section::VolunteerWork => "Volunteer Work",
            Section::ProfessionalAffiliations => "Professional Affiliations",
            Section::Languages => "Languages",
            Section::Interests => "Interests",
        }
    }

    /// Exact match only; "Experience" does not match "Professional Experience".
    pub fn from_heading(text: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.heading() == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(name: &str, skills: &[&str]) -> SkillCategory {
        SkillCategory {
            category: name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_skills_serialize_in_category_order() {
        let skills = Skills::from_categories([
            category("zeta", &["Go"]),
            category("alpha", &["Rust"]),
        ]);
        let json = serde_json::to_string(&skills).unwrap();
        assert_eq!(json, r#"{"zeta":["Go"],"alpha":["Rust"]}"#);
    }

    #[test]
    fn test_skills_rename_keeps_slot() {
        let mut skills = Skills::from_categories([
            category("technical", &["Rust"]),
            category("soft", &["Mentoring"]),
            category("other", &[]),
        ]);
        assert!(skills.rename("soft", "Leadership"));
        let names: Vec<_> = skills.categories().iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, ["technical", "Leadership", "other"]);
        assert_eq!(skills.get("Leadership"), Some(&["Mentoring".to_string()][..]));
    }

    #[test]
    fn test_skills_rename_rejects_duplicate() {
        let mut skills =
            Skills::from_categories([category("technical", &[]), category("soft", &[])]);
        assert!(!skills.rename("soft", "technical"));
        assert!(skills.contains("soft"));
    }

    #[test]
    fn test_skills_from_categories_drops_duplicates() {
        let skills = Skills::from_categories([
            category("technical", &["Rust"]),
            category("technical", &["Go"]),
        ]);
        assert_eq!(skills.len(), 1);
        assert_eq!(skills.get("technical"), Some(&["Rust".to_string()][..]));
    }

    #[test]
    fn test_resume_deserialize_goes_through_normalizer() {
        let resume: Resume = serde_json::from_value(json!({
            "contactInfo": { "name": "Jane Doe" },
            "skills": ["Go", "Rust"],
            "unknown": true
        }))
        .unwrap();
        assert_eq!(resume.contact_info.name, "Jane Doe");
        assert_eq!(resume.contact_info.email, "");
        assert_eq!(resume.skills.len(), 3);
    }

    #[test]
    fn test_resume_serializes_camel_case_keys() {
        let value = serde_json::to_value(Resume::default()).unwrap();
        for key in [
            "contactInfo",
            "summaryOrObjective",
            "experience",
            "education",
            "projects",
            "skills",
            "certifications",
            "awards",
            "volunteerWork",
            "professionalAffiliations",
            "languages",
            "interests",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_section_from_heading_is_exact() {
        assert_eq!(
            Section::from_heading("Professional Experience"),
            Some(Section::Experience)
        );
        assert_eq!(Section::from_heading("Experience"), None);
        assert_eq!(Section::from_heading("skills"), None);
    }
}
