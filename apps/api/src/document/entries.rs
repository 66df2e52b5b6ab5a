// Direct-edit helpers for the id-carrying collections. Adding or removing an entry
// produces the next full sequence, which the store then routes through the dispatcher
// like any other replace.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::models::{EducationEntry, ExperienceEntry, ProjectEntry, ResumeDocument};
use crate::document::mutation::MutationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryCollection {
    Experience,
    Education,
    Projects,
}

impl EntryCollection {
    pub fn mutation(self) -> MutationKind {
        match self {
            EntryCollection::Experience => MutationKind::UpdateExperience,
            EntryCollection::Education => MutationKind::UpdateEducation,
            EntryCollection::Projects => MutationKind::UpdateProjects,
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            EntryCollection::Experience => "exp",
            EntryCollection::Education => "edu",
            EntryCollection::Projects => "proj",
        }
    }
}

/// Time-based id, e.g. `exp-1718000000123`. Collisions are not guarded against.
pub fn new_entry_id(prefix: &str) -> String {
    format!("{prefix}-{}", Utc::now().timestamp_millis())
}

fn blank_experience(id: String) -> ExperienceEntry {
    let year = Utc::now().year();
    ExperienceEntry {
        id,
        role: "NEW ROLE".to_string(),
        company: "NEW COMPANY".to_string(),
        period: year.to_string(),
        year,
        description: "Description...".to_string(),
        achievements: vec!["Achievement 1".to_string()],
        tech_stack: vec!["Tech 1".to_string()],
    }
}

fn blank_education(id: String) -> EducationEntry {
    let year = Utc::now().year();
    EducationEntry {
        id,
        school: "NEW INSTITUTION".to_string(),
        degree: "DEGREE / CERTIFICATE".to_string(),
        year,
        period: year.to_string(),
        description: "Focus of study...".to_string(),
    }
}

fn blank_project(id: String) -> ProjectEntry {
    ProjectEntry {
        id,
        name: "NEW PROJECT".to_string(),
        description: "Project description...".to_string(),
        tech: vec!["Tech 1".to_string(), "Tech 2".to_string()],
        link: None,
    }
}

fn prepend<T: Clone + Serialize>(entry: T, rest: &[T]) -> Result<Value, serde_json::Error> {
    let mut next = Vec::with_capacity(rest.len() + 1);
    next.push(entry);
    next.extend_from_slice(rest);
    serde_json::to_value(next)
}

fn without<T: Serialize>(
    entries: &[T],
    id: &str,
    id_of: impl Fn(&T) -> &str,
) -> Option<Result<Value, serde_json::Error>> {
    if !entries.iter().any(|e| id_of(e) == id) {
        return None;
    }
    let kept: Vec<&T> = entries.iter().filter(|e| id_of(e) != id).collect();
    Some(serde_json::to_value(kept))
}

/// The collection with a fresh blank entry at the front, plus the new entry's id.
pub fn with_new_entry(
    doc: &ResumeDocument,
    collection: EntryCollection,
) -> Result<(String, Value), serde_json::Error> {
    let id = new_entry_id(collection.id_prefix());
    let data = match collection {
        EntryCollection::Experience => prepend(blank_experience(id.clone()), &doc.experience)?,
        EntryCollection::Education => prepend(blank_education(id.clone()), &doc.education)?,
        EntryCollection::Projects => prepend(blank_project(id.clone()), &doc.projects)?,
    };
    Ok((id, data))
}

/// The collection minus every entry carrying `id`; `None` if no entry has it.
pub fn without_entry(
    doc: &ResumeDocument,
    collection: EntryCollection,
    id: &str,
) -> Option<Result<Value, serde_json::Error>> {
    match collection {
        EntryCollection::Experience => without(&doc.experience, id, |e| e.id.as_str()),
        EntryCollection::Education => without(&doc.education, id, |e| e.id.as_str()),
        EntryCollection::Projects => without(&doc.projects, id, |e| e.id.as_str()),
    }
}
