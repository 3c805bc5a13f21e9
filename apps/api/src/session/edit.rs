//! Single-step resume mutations.
//!
//! [`apply_edit`] never touches its input: it returns the edited copy, `None`
//! for a no-op, or an [`EditError`].

use thiserror::Error;

use crate::resume::model::{Degree, Job, Project, Resume, SkillCategory};
use crate::resume::normalize::split_comma_list;

pub const NEW_CATEGORY: &str = "New Category";
pub const NEW_CATEGORY_SKILLS: [&str; 2] = ["Skill 1", "Skill 2"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{list} has no entry at index {index}")]
    NoSuchEntry { list: &'static str, index: usize },

    #[error("Entry {index} has no bullet at index {bullet}")]
    NoSuchBullet { index: usize, bullet: usize },

    #[error("Unknown skill category '{0}'")]
    UnknownCategory(String),

    #[error("Skill category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("Skill category name cannot be empty")]
    EmptyCategoryName,

    #[error("Edits are only accepted in edit mode")]
    NotEditing,

    #[error("A save is in progress")]
    SaveInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Location,
    Email,
    Phone,
    Linkedin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Title,
    Company,
    Location,
    Dates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeField {
    Degree,
    Major,
    Institution,
    GraduationYear,
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Description,
}

/// The entry sections addressable by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryList {
    Experience,
    Education,
    Projects,
}

impl EntryList {
    fn name(self) -> &'static str {
        match self {
            EntryList::Experience => "experience",
            EntryList::Education => "education",
            EntryList::Projects => "projects",
        }
    }
}

/// Sections whose entries carry bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletList {
    Experience,
    Projects,
}

/// A caller-supplied entry for [`Edit::Append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Job(Job),
    Degree(Degree),
    Project(Project),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    SetContact { field: ContactField, value: String },
    SetSummary(String),
    SetJob { index: usize, field: JobField, value: String },
    SetDegree { index: usize, field: DegreeField, value: String },
    SetProject { index: usize, field: ProjectField, value: String },
    Append(Entry),
    Remove { list: EntryList, index: usize },
    Move { list: EntryList, index: usize, direction: Direction },
    /// Appends an empty bullet.
    AddBullet { list: BulletList, index: usize },
    SetBullet { list: BulletList, index: usize, bullet: usize, value: String },
    RemoveBullet { list: BulletList, index: usize, bullet: usize },
    RenameCategory { from: String, to: String },
    /// Replaces a category's skills from a comma-separated string.
    SetCategorySkills { category: String, raw: String },
    AddCategory,
    RemoveCategory(String),
}

pub fn apply_edit(resume: &Resume, edit: &Edit) -> Result<Option<Resume>, EditError> {
    let mut next = resume.clone();
    match edit {
        Edit::SetContact { field, value } => {
            let contact = &mut next.contact_info;
            let slot = match field {
                ContactField::Name => &mut contact.name,
                ContactField::Location => &mut contact.location,
                ContactField::Email => &mut contact.email,
                ContactField::Phone => &mut contact.phone,
                ContactField::Linkedin => &mut contact.linkedin,
            };
            *slot = value.clone();
        }
        Edit::SetSummary(value) => next.summary_or_objective = value.clone(),
        Edit::SetJob { index, field, value } => {
            let job = entry_mut(&mut next.experience, EntryList::Experience, *index)?;
            let slot = match field {
                JobField::Title => &mut job.title,
                JobField::Company => &mut job.company,
                JobField::Location => &mut job.location,
                JobField::Dates => &mut job.dates,
            };
            *slot = value.clone();
        }
        Edit::SetDegree { index, field, value } => {
            let degree = entry_mut(&mut next.education, EntryList::Education, *index)?;
            let slot = match field {
                DegreeField::Degree => &mut degree.degree,
                DegreeField::Major => &mut degree.major,
                DegreeField::Institution => &mut degree.institution,
                DegreeField::GraduationYear => &mut degree.graduation_year,
                DegreeField::Details => &mut degree.details,
            };
            *slot = value.clone();
        }
        Edit::SetProject { index, field, value } => {
            let project = entry_mut(&mut next.projects, EntryList::Projects, *index)?;
            let slot = match field {
                ProjectField::Name => &mut project.name,
                ProjectField::Description => &mut project.description,
            };
            *slot = value.clone();
        }
        Edit::Append(entry) => match entry {
            Entry::Job(job) => next.experience.push(job.clone()),
            Entry::Degree(degree) => next.education.push(degree.clone()),
            Entry::Project(project) => next.projects.push(project.clone()),
        },
        Edit::Remove { list, index } => match list {
            EntryList::Experience => remove_at(&mut next.experience, *list, *index)?,
            EntryList::Education => remove_at(&mut next.education, *list, *index)?,
            EntryList::Projects => remove_at(&mut next.projects, *list, *index)?,
        },
        Edit::Move { list, index, direction } => {
            let moved = match list {
                EntryList::Experience => move_at(&mut next.experience, *list, *index, *direction)?,
                EntryList::Education => move_at(&mut next.education, *list, *index, *direction)?,
                EntryList::Projects => move_at(&mut next.projects, *list, *index, *direction)?,
            };
            if !moved {
                return Ok(None);
            }
        }
        Edit::AddBullet { list, index } => bullets_mut(&mut next, *list, *index)?.push(String::new()),
        Edit::SetBullet { list, index, bullet, value } => {
            let bullets = bullets_mut(&mut next, *list, *index)?;
            let slot = bullets.get_mut(*bullet).ok_or(EditError::NoSuchBullet {
                index: *index,
                bullet: *bullet,
            })?;
            *slot = value.clone();
        }
        Edit::RemoveBullet { list, index, bullet } => {
            let bullets = bullets_mut(&mut next, *list, *index)?;
            if *bullet >= bullets.len() {
                return Err(EditError::NoSuchBullet { index: *index, bullet: *bullet });
            }
            bullets.remove(*bullet);
        }
        Edit::RenameCategory { from, to } => {
            let to = to.trim();
            if to.is_empty() {
                return Err(EditError::EmptyCategoryName);
            }
            if !next.skills.contains(from) {
                return Err(EditError::UnknownCategory(from.clone()));
            }
            if from == to {
                return Ok(None);
            }
            if !next.skills.rename(from, to) {
                return Err(EditError::DuplicateCategory(to.to_string()));
            }
        }
        Edit::SetCategorySkills { category, raw } => {
            if !next.skills.set(category, split_comma_list(raw)) {
                return Err(EditError::UnknownCategory(category.clone()));
            }
        }
        Edit::AddCategory => {
            let name = free_category_name(&next);
            next.skills.push(SkillCategory {
                category: name,
                skills: NEW_CATEGORY_SKILLS.iter().map(|s| s.to_string()).collect(),
            });
        }
        Edit::RemoveCategory(category) => {
            if next.skills.remove(category).is_none() {
                return Err(EditError::UnknownCategory(category.clone()));
            }
        }
    }
    Ok(Some(next))
}

fn entry_mut<T>(items: &mut [T], list: EntryList, index: usize) -> Result<&mut T, EditError> {
    items.get_mut(index).ok_or(EditError::NoSuchEntry {
        list: list.name(),
        index,
    })
}

fn remove_at<T>(items: &mut Vec<T>, list: EntryList, index: usize) -> Result<(), EditError> {
    if index >= items.len() {
        return Err(EditError::NoSuchEntry { list: list.name(), index });
    }
    items.remove(index);
    Ok(())
}

/// Swaps with the neighbour. `Ok(false)` at either boundary.
fn move_at<T>(
    items: &mut [T],
    list: EntryList,
    index: usize,
    direction: Direction,
) -> Result<bool, EditError> {
    if index >= items.len() {
        return Err(EditError::NoSuchEntry { list: list.name(), index });
    }
    let target = match direction {
        Direction::Up if index == 0 => return Ok(false),
        Direction::Up => index - 1,
        Direction::Down if index + 1 == items.len() => return Ok(false),
        Direction::Down => index + 1,
    };
    items.swap(index, target);
    Ok(true)
}

fn bullets_mut(
    resume: &mut Resume,
    list: BulletList,
    index: usize,
) -> Result<&mut Vec<String>, EditError> {
    match list {
        BulletList::Experience => {
            Ok(&mut entry_mut(&mut resume.experience, EntryList::Experience, index)?.bullets)
        }
        BulletList::Projects => {
            Ok(&mut entry_mut(&mut resume.projects, EntryList::Projects, index)?.bullets)
        }
    }
}

/// `"New Category"`, then `"New Category 2"`, `"New Category 3"`...
fn free_category_name(resume: &Resume) -> String {
    if !resume.skills.contains(NEW_CATEGORY) {
        return NEW_CATEGORY.to_string();
    }
    (2..)
        .map(|n| format!("{NEW_CATEGORY} {n}"))
        .find(|name| !resume.skills.contains(name))
        .unwrap_or_else(|| NEW_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::model::Skills;

    fn job(title: &str) -> Job {
        Job {
            title: title.to_string(),
            bullets: vec!["a".to_string(), "b".to_string()],
            ..Job::default()
        }
    }

    fn sample() -> Resume {
        Resume {
            experience: vec![job("First"), job("Second"), job("Third")],
            education: vec![Degree {
                degree: "BS".to_string(),
                graduation_year: "Extracted from resume".to_string(),
                ..Degree::default()
            }],
            skills: Skills::from_categories([
                SkillCategory {
                    category: "technical".to_string(),
                    skills: vec!["Rust".to_string()],
                },
                SkillCategory {
                    category: "soft".to_string(),
                    skills: vec![],
                },
            ]),
            ..Resume::default()
        }
    }

    fn titles(resume: &Resume) -> Vec<&str> {
        resume.experience.iter().map(|j| j.title.as_str()).collect()
    }

    fn categories(resume: &Resume) -> Vec<&str> {
        resume
            .skills
            .categories()
            .iter()
            .map(|c| c.category.as_str())
            .collect()
    }

    #[test]
    fn test_set_fields_leave_input_untouched() {
        let before = sample();
        let after = apply_edit(
            &before,
            &Edit::SetDegree {
                index: 0,
                field: DegreeField::GraduationYear,
                value: "2021".to_string(),
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(after.education[0].graduation_year, "2021");
        assert_eq!(before.education[0].graduation_year, "Extracted from resume");
    }

    #[test]
    fn test_move_swaps_neighbours() {
        let moved = apply_edit(
            &sample(),
            &Edit::Move {
                list: EntryList::Experience,
                index: 1,
                direction: Direction::Up,
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(titles(&moved), ["Second", "First", "Third"]);
    }

    #[test]
    fn test_move_at_boundaries_is_noop() {
        let resume = sample();
        let up = Edit::Move { list: EntryList::Experience, index: 0, direction: Direction::Up };
        let down = Edit::Move { list: EntryList::Experience, index: 2, direction: Direction::Down };
        assert_eq!(apply_edit(&resume, &up), Ok(None));
        assert_eq!(apply_edit(&resume, &down), Ok(None));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let resume = sample();
        assert_eq!(
            apply_edit(&resume, &Edit::Remove { list: EntryList::Projects, index: 0 }),
            Err(EditError::NoSuchEntry { list: "projects", index: 0 })
        );
        assert_eq!(
            apply_edit(
                &resume,
                &Edit::RemoveBullet { list: BulletList::Experience, index: 0, bullet: 5 }
            ),
            Err(EditError::NoSuchBullet { index: 0, bullet: 5 })
        );
        assert!(apply_edit(
            &resume,
            &Edit::Move { list: EntryList::Experience, index: 9, direction: Direction::Up }
        )
        .is_err());
    }

    #[test]
    fn test_remove_shifts_indices() {
        let after = apply_edit(&sample(), &Edit::Remove { list: EntryList::Experience, index: 0 })
            .unwrap()
            .unwrap();
        assert_eq!(titles(&after), ["Second", "Third"]);
    }

    #[test]
    fn test_bullet_edits() {
        let resume = sample();
        let added = apply_edit(&resume, &Edit::AddBullet { list: BulletList::Experience, index: 1 })
            .unwrap()
            .unwrap();
        assert_eq!(added.experience[1].bullets, ["a", "b", ""]);

        let set = apply_edit(
            &added,
            &Edit::SetBullet {
                list: BulletList::Experience,
                index: 1,
                bullet: 2,
                value: "Led migration".to_string(),
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(set.experience[1].bullets[2], "Led migration");

        let removed = apply_edit(
            &set,
            &Edit::RemoveBullet { list: BulletList::Experience, index: 1, bullet: 0 },
        )
        .unwrap()
        .unwrap();
        assert_eq!(removed.experience[1].bullets, ["b", "Led migration"]);
    }

    #[test]
    fn test_append_uses_caller_template() {
        let template = Project {
            name: "Project Name".to_string(),
            description: "Project description".to_string(),
            bullets: vec!["Key feature or achievement".to_string()],
        };
        let after = apply_edit(&sample(), &Edit::Append(Entry::Project(template.clone())))
            .unwrap()
            .unwrap();
        assert_eq!(after.projects, [template]);
    }

    #[test]
    fn test_rename_category_keeps_slot() {
        let after = apply_edit(
            &sample(),
            &Edit::RenameCategory { from: "technical".to_string(), to: "Languages".to_string() },
        )
        .unwrap()
        .unwrap();
        assert_eq!(categories(&after), ["Languages", "soft"]);
    }

    #[test]
    fn test_rename_category_rejections() {
        let resume = sample();
        let rename = |from: &str, to: &str| {
            apply_edit(
                &resume,
                &Edit::RenameCategory { from: from.to_string(), to: to.to_string() },
            )
        };
        assert_eq!(rename("soft", "technical"), Err(EditError::DuplicateCategory("technical".to_string())));
        assert_eq!(rename("soft", "  "), Err(EditError::EmptyCategoryName));
        assert_eq!(rename("missing", "x"), Err(EditError::UnknownCategory("missing".to_string())));
        assert_eq!(rename("soft", "soft"), Ok(None));
    }

    #[test]
    fn test_set_category_skills_splits_commas() {
        let after = apply_edit(
            &sample(),
            &Edit::SetCategorySkills {
                category: "soft".to_string(),
                raw: " Mentoring, ,Writing ,".to_string(),
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            after.skills.get("soft"),
            Some(&["Mentoring".to_string(), "Writing".to_string()][..])
        );
    }

    #[test]
    fn test_add_category_suffixes_names() {
        let once = apply_edit(&sample(), &Edit::AddCategory).unwrap().unwrap();
        let twice = apply_edit(&once, &Edit::AddCategory).unwrap().unwrap();
        let thrice = apply_edit(&twice, &Edit::AddCategory).unwrap().unwrap();
        assert_eq!(
            categories(&thrice),
            ["technical", "soft", "New Category", "New Category 2", "New Category 3"]
        );
        assert_eq!(
            thrice.skills.get("New Category"),
            Some(&["Skill 1".to_string(), "Skill 2".to_string()][..])
        );
    }

    #[test]
    fn test_remove_category() {
        let resume = sample();
        let after = apply_edit(&resume, &Edit::RemoveCategory("technical".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(categories(&after), ["soft"]);
        assert_eq!(
            apply_edit(&resume, &Edit::RemoveCategory("nope".to_string())),
            Err(EditError::UnknownCategory("nope".to_string()))
        );
    }
}
