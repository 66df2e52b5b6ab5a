//! Mutation Dispatcher: the only path by which document content changes.
//!
//! Five closed tags. `UPDATE_PROFILE` merges field by field; the other four replace a
//! whole collection through one generic operation. Unknown tags are ignored.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::document::lenient::{optional_u32, strip_nulls};
use crate::document::models::{Profile, ResumeDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    UpdateProfile,
    UpdateSkills,
    UpdateExperience,
    UpdateEducation,
    UpdateProjects,
}

impl MutationKind {
    pub const ALL: [MutationKind; 5] = [
        MutationKind::UpdateProfile,
        MutationKind::UpdateSkills,
        MutationKind::UpdateExperience,
        MutationKind::UpdateEducation,
        MutationKind::UpdateProjects,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            MutationKind::UpdateProfile => "UPDATE_PROFILE",
            MutationKind::UpdateSkills => "UPDATE_SKILLS",
            MutationKind::UpdateExperience => "UPDATE_EXPERIENCE",
            MutationKind::UpdateEducation => "UPDATE_EDUCATION",
            MutationKind::UpdateProjects => "UPDATE_PROJECTS",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MutationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MutationKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or(())
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("{kind} payload does not fit the document: {source}")]
    Malformed {
        kind: MutationKind,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Applied(MutationKind),
    Ignored,
}

/// Partial contact update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactPatch {
    pub email: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsPatch {
    #[serde(deserialize_with = "optional_u32")]
    pub intelligence: Option<u32>,
    #[serde(deserialize_with = "optional_u32")]
    pub creativity: Option<u32>,
    #[serde(deserialize_with = "optional_u32")]
    pub endurance: Option<u32>,
    #[serde(deserialize_with = "optional_u32")]
    pub charisma: Option<u32>,
    #[serde(deserialize_with = "optional_u32")]
    pub agility: Option<u32>,
    #[serde(deserialize_with = "optional_u32")]
    pub luck: Option<u32>,
}

/// Payload of `UPDATE_PROFILE`: any subset of profile fields. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub title: Option<String>,
    #[serde(deserialize_with = "optional_u32")]
    pub level: Option<u32>,
    pub bio: Option<String>,
    pub contact: Option<ContactPatch>,
    pub stats: Option<StatsPatch>,
}

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Profile {
    pub fn apply_patch(&mut self, patch: ProfilePatch) {
        merge(&mut self.name, patch.name);
        merge(&mut self.title, patch.title);
        merge(&mut self.level, patch.level);
        merge(&mut self.bio, patch.bio);

        if let Some(contact) = patch.contact {
            merge(&mut self.contact.email, contact.email);
            merge(&mut self.contact.github, contact.github);
            merge(&mut self.contact.linkedin, contact.linkedin);
            if contact.phone.is_some() {
                self.contact.phone = contact.phone;
            }
            if contact.location.is_some() {
                self.contact.location = contact.location;
            }
        }

        if let Some(stats) = patch.stats {
            merge(&mut self.stats.intelligence, stats.intelligence);
            merge(&mut self.stats.creativity, stats.creativity);
            merge(&mut self.stats.endurance, stats.endurance);
            merge(&mut self.stats.charisma, stats.charisma);
            merge(&mut self.stats.agility, stats.agility);
            merge(&mut self.stats.luck, stats.luck);
        }
    }
}

/// `null` fields count as absent, so a patch may carry them without clearing anything.
fn decode<T: DeserializeOwned>(kind: MutationKind, mut data: Value) -> Result<T, MutationError> {
    strip_nulls(&mut data);
    serde_json::from_value(data).map_err(|source| MutationError::Malformed { kind, source })
}

/// Replaces a whole collection. The payload is decoded first, so a rejected payload
/// leaves `target` untouched.
fn replace_collection<T: DeserializeOwned>(
    target: &mut Vec<T>,
    kind: MutationKind,
    data: Value,
) -> Result<(), MutationError> {
    *target = decode(kind, data)?;
    Ok(())
}

/// Routes a tagged payload to its handler. Persistence is the caller's job.
pub fn dispatch(
    doc: &mut ResumeDocument,
    tag: &str,
    data: Value,
) -> Result<DispatchOutcome, MutationError> {
    let Ok(kind) = tag.parse::<MutationKind>() else {
        return Ok(DispatchOutcome::Ignored);
    };

    match kind {
        MutationKind::UpdateProfile => {
            let patch: ProfilePatch = decode(kind, data)?;
            doc.profile.apply_patch(patch);
        }
        MutationKind::UpdateSkills => replace_collection(&mut doc.skills, kind, data)?,
        MutationKind::UpdateExperience => replace_collection(&mut doc.experience, kind, data)?,
        MutationKind::UpdateEducation => replace_collection(&mut doc.education, kind, data)?,
        MutationKind::UpdateProjects => replace_collection(&mut doc.projects, kind, data)?,
    }

    Ok(DispatchOutcome::Applied(kind))
}
