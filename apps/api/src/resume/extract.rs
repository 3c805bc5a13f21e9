//! Recovers a [`Resume`] from HTML produced by [`template`](crate::resume::template).
//!
//! Lossy by nature: it only understands the renderer's landmarks. Anything it
//! cannot find degrades to defaults for that subtree, never to an error.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::resume::model::{
    ContactInfo, Degree, Job, Project, Resume, Section, SkillCategory, Skills,
};

struct Selectors {
    h1: Selector,
    h2: Selector,
    h3: Selector,
    p: Selector,
    li: Selector,
    contact_line: Selector,
    mailto: Selector,
    anchor: Selector,
    job: Selector,
    job_meta: Selector,
    degree: Selector,
    degree_meta: Selector,
    degree_details: Selector,
    project: Selector,
    project_description: Selector,
    skills_category: Selector,
}

impl Selectors {
    fn build() -> Result<Self, String> {
        let parse = |css: &str| {
            Selector::parse(css).map_err(|e| format!("invalid selector '{css}': {e:?}"))
        };
        Ok(Self {
            h1: parse("h1")?,
            h2: parse("h2")?,
            h3: parse("h3")?,
            p: parse("p")?,
            li: parse("li")?,
            contact_line: parse(".contact-line")?,
            mailto: parse(r#"a[href^="mailto:"]"#)?,
            anchor: parse("a[href]")?,
            job: parse(".job")?,
            job_meta: parse(".job-meta")?,
            degree: parse(".degree")?,
            degree_meta: parse(".degree-meta")?,
            degree_details: parse(".degree-details")?,
            project: parse(".project")?,
            project_description: parse(".project-description")?,
            skills_category: parse(".skills-category")?,
        })
    }
}

static SELECTORS: Lazy<Result<Selectors, String>> = Lazy::new(Selectors::build);

pub fn extract(html: &str) -> Resume {
    if html.trim().is_empty() {
        warn!("Extraction called with blank HTML, using fallback resume");
        return fallback_resume(html);
    }
    let sel = match SELECTORS.as_ref() {
        Ok(sel) => sel,
        Err(e) => {
            warn!("Extractor selectors unavailable ({e}), using fallback resume");
            return fallback_resume(html);
        }
    };

    let doc = Html::parse_document(html);
    let mut resume = Resume {
        contact_info: extract_contact(&doc, sel),
        ..Resume::default()
    };

    for heading in doc.select(&sel.h2) {
        let Some(section) = Section::from_heading(&text_of(heading)) else {
            continue;
        };
        let Some(container) = heading.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        debug!("Extracting section '{}'", section.heading());

        match section {
            Section::Summary => {
                resume.summary_or_objective =
                    container.select(&sel.p).next().map(text_of).unwrap_or_default();
            }
            Section::Experience => {
                resume.experience = container.select(&sel.job).map(|el| job(el, sel)).collect();
            }
            Section::Education => {
                resume.education = container
                    .select(&sel.degree)
                    .map(|el| degree(el, sel))
                    .collect();
            }
            Section::Projects => {
                resume.projects = container
                    .select(&sel.project)
                    .map(|el| project(el, sel))
                    .collect();
            }
            Section::Skills => {
                resume.skills = Skills::from_categories(container.select(&sel.skills_category).map(
                    |el| SkillCategory {
                        category: first_text(el, &sel.h3).to_lowercase(),
                        skills: list_items(el, sel),
                    },
                ));
            }
            extended => {
                if let Some(items) = resume.extended_section_mut(extended) {
                    *items = list_items(container, sel);
                }
            }
        }
    }

    resume
}

/// Used when the document cannot be inspected at all: keep the name if there
/// is one, default everything else.
fn fallback_resume(html: &str) -> Resume {
    let doc = Html::parse_document(html);
    let mut name = String::new();
    if let Ok(h1) = Selector::parse("h1") {
        if let Some(first) = doc.select(&h1).next() {
            name = text_of(first);
        }
    }
    Resume {
        contact_info: ContactInfo {
            name,
            ..ContactInfo::default()
        },
        ..Resume::default()
    }
}

fn extract_contact(doc: &Html, sel: &Selectors) -> ContactInfo {
    let name = doc.select(&sel.h1).next().map(text_of).unwrap_or_default();

    let line = doc
        .select(&sel.contact_line)
        .next()
        .map(text_of)
        .unwrap_or_default();
    let mut segments = line.split('|').map(str::trim);
    let location = segments.next().unwrap_or_default().to_string();
    let phone = segments
        .find(|s| s.chars().any(|c| c.is_ascii_digit()) && !s.contains('@'))
        .unwrap_or_default()
        .to_string();

    let email = doc
        .select(&sel.mailto)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim_start_matches("mailto:").trim().to_string())
        .unwrap_or_default();

    let linkedin = doc
        .select(&sel.anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.starts_with("mailto:"))
        .find(|href| href.to_lowercase().contains("linkedin"))
        .unwrap_or_default()
        .to_string();

    ContactInfo {
        name,
        location,
        email,
        phone,
        linkedin,
    }
}

fn job(el: ElementRef, sel: &Selectors) -> Job {
    let meta = first_text(el, &sel.job_meta);
    let mut parts = positional(&meta, '|');
    Job {
        title: first_text(el, &sel.h3),
        company: parts.next().unwrap_or_default(),
        location: parts.next().unwrap_or_default(),
        dates: parts.next().unwrap_or_default(),
        bullets: list_items(el, sel),
    }
}

/// The heading is split on every `,`, so a degree or major that itself
/// contains a comma loses everything after its second part.
fn degree(el: ElementRef, sel: &Selectors) -> Degree {
    let heading = first_text(el, &sel.h3);
    let mut names = positional(&heading, ',');
    let meta = first_text(el, &sel.degree_meta);
    let mut meta_parts = positional(&meta, '-');
    Degree {
        degree: names.next().unwrap_or_default(),
        major: names.next().unwrap_or_default(),
        institution: meta_parts.next().unwrap_or_default(),
        graduation_year: meta_parts.next().unwrap_or_default(),
        details: first_text(el, &sel.degree_details),
    }
}

fn project(el: ElementRef, sel: &Selectors) -> Project {
    Project {
        name: first_text(el, &sel.h3),
        description: first_text(el, &sel.project_description),
        bullets: list_items(el, sel),
    }
}

/// Trimmed parts of `text` split on `delim`. Empty text yields no parts.
fn positional(text: &str, delim: char) -> impl Iterator<Item = String> + '_ {
    text.split(delim)
        .filter(move |_| !text.is_empty())
        .map(|part| part.trim().to_string())
}

fn list_items(el: ElementRef, sel: &Selectors) -> Vec<String> {
    el.select(&sel.li).map(text_of).collect()
}

fn first_text(el: ElementRef, selector: &Selector) -> String {
    el.select(selector).next().map(text_of).unwrap_or_default()
}

/// Element text with whitespace runs collapsed.
fn text_of(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
