//! Renders a canonical `Resume` to HTML.
//!
//! The markup is also the input format of [`extract`](crate::resume::extract),
//! so the landmarks below are load-bearing:
//! - section headings use the exact text of [`Section::heading`]
//! - one wrapper per entry: `.job`, `.degree`, `.project`, `.skills-category`
//! - `|` separates company/location/dates and contact items,
//!   `,` separates degree/major, `-` separates institution/graduation year

use askama::Template;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::resume::model::{ContactInfo, Degree, Job, Project, Resume, SkillCategory};
use crate::resume::normalize::normalize;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template data is missing required generatedSections object.")]
    MissingSections,

    #[error("Failed to render resume template: {0}")]
    Template(#[from] askama::Error),
}

struct ExtendedSection<'a> {
    heading: &'static str,
    items: &'a [String],
}

#[derive(Template)]
#[template(
    source = r#"<div class="resume">
{%- if !contact.name.is_empty() || has_contact_line %}
<div class="section contact-info">
{%- if !contact.name.is_empty() %}
<h1>{{ contact.name }}</h1>
{%- endif %}
{%- if has_contact_line %}
<p class="contact-line">{% if !contact.location.is_empty() %}<span class="contact-location">{{ contact.location }}</span>{% endif %}{% if !contact.phone.is_empty() %}<span class="contact-phone"> | {{ contact.phone }}</span>{% endif %}{% if !contact.email.is_empty() %}<span class="contact-email"> | <a href="mailto:{{ contact.email }}">{{ contact.email }}</a></span>{% endif %}{% if !contact.linkedin.is_empty() %}<span class="contact-linkedin"> | <a href="{{ contact.linkedin }}">LinkedIn</a></span>{% endif %}</p>
{%- endif %}
</div>
{%- endif %}
{%- if !summary.is_empty() %}
<div class="section summary">
<h2>Summary / Objective</h2>
<p class="summary-text">{{ summary }}</p>
</div>
{%- endif %}
{%- if !experience.is_empty() %}
<div class="section experience">
<h2>Professional Experience</h2>
{%- for job in experience %}
<div class="job">
<h3>{{ job.title }}</h3>
{%- if !job.company.is_empty() || !job.location.is_empty() || !job.dates.is_empty() %}
<p class="job-meta">{{ job.company }} | {{ job.location }} | {{ job.dates }}</p>
{%- endif %}
{%- if !job.bullets.is_empty() %}
<ul>
{%- for bullet in job.bullets %}
<li>{{ bullet }}</li>
{%- endfor %}
</ul>
{%- endif %}
</div>
{%- endfor %}
</div>
{%- endif %}
{%- if !education.is_empty() %}
<div class="section education">
<h2>Education</h2>
{%- for edu in education %}
<div class="degree">
<h3>{{ edu.degree }}{% if !edu.major.is_empty() %}, {{ edu.major }}{% endif %}</h3>
{%- if !edu.institution.is_empty() || !edu.graduation_year.is_empty() %}
<p class="degree-meta">{{ edu.institution }}{% if !edu.graduation_year.is_empty() %} - {{ edu.graduation_year }}{% endif %}</p>
{%- endif %}
{%- if !edu.details.is_empty() %}
<p class="degree-details">{{ edu.details }}</p>
{%- endif %}
</div>
{%- endfor %}
</div>
{%- endif %}
{%- if !projects.is_empty() %}
<div class="section projects">
<h2>Projects</h2>
{%- for project in projects %}
<div class="project">
<h3>{{ project.name }}</h3>
{%- if !project.description.is_empty() %}
<p class="project-description">{{ project.description }}</p>
{%- endif %}
{%- if !project.bullets.is_empty() %}
<ul>
{%- for bullet in project.bullets %}
<li>{{ bullet }}</li>
{%- endfor %}
</ul>
{%- endif %}
</div>
{%- endfor %}
</div>
{%- endif %}
{%- if !skills.is_empty() %}
<div class="section skills-section">
<h2>Skills</h2>
{%- for group in skills %}
<div class="skills-category">
<h3>{{ group.category }}</h3>
<ul>
{%- for skill in group.skills %}
<li>{{ skill }}</li>
{%- endfor %}
</ul>
</div>
{%- endfor %}
</div>
{%- endif %}
{%- for extra in extended %}
<div class="section extended">
<h2>{{ extra.heading }}</h2>
<ul>
{%- for item in extra.items %}
<li>{{ item }}</li>
{%- endfor %}
</ul>
</div>
{%- endfor %}
</div>
"#,
    ext = "html"
)]
struct ResumeTemplate<'a> {
    contact: &'a ContactInfo,
    has_contact_line: bool,
    summary: &'a str,
    experience: &'a [Job],
    education: &'a [Degree],
    projects: &'a [Project],
    skills: &'a [SkillCategory],
    extended: Vec<ExtendedSection<'a>>,
}

impl<'a> ResumeTemplate<'a> {
    fn new(resume: &'a Resume) -> Self {
        let contact = &resume.contact_info;
        Self {
            contact,
            has_contact_line: [
                &contact.location,
                &contact.phone,
                &contact.email,
                &contact.linkedin,
            ]
            .iter()
            .any(|field| !field.is_empty()),
            summary: &resume.summary_or_objective,
            experience: &resume.experience,
            education: &resume.education,
            projects: &resume.projects,
            skills: resume.skills.categories(),
            extended: resume
                .extended_sections()
                .into_iter()
                .filter(|(_, items)| !items.is_empty())
                .map(|(section, items)| ExtendedSection {
                    heading: section.heading(),
                    items,
                })
                .collect(),
        }
    }
}

/// Renders a normalized resume. Empty sections are omitted entirely.
pub fn render(resume: &Resume) -> Result<String, RenderError> {
    let html = ResumeTemplate::new(resume).render()?;
    debug!(
        "Rendered resume: {} bytes, {} jobs, {} degrees, {} skill categories",
        html.len(),
        resume.experience.len(),
        resume.education.len(),
        resume.skills.len()
    );
    Ok(html)
}

/// Renders the `{ "generatedSections": <resume> }` envelope.
///
/// A missing (or null) `generatedSections` is an input error, not a default.
pub fn render_envelope(envelope: &Value) -> Result<String, RenderError> {
    let sections = envelope
        .get("generatedSections")
        .filter(|v| !v.is_null())
        .ok_or(RenderError::MissingSections)?;
    render(&normalize(sections))
}
