//! Snapshot import/export and the stored-document shape check.
//!
//! The same decoder serves the persistence slot and user imports; they differ only in
//! which top-level keys are required and in what happens on failure (seed fallback vs
//! a user-visible rejection).
//!
//! Past the required keys, decoding is per section and per record: an unreadable record
//! or section is dropped with a warning instead of failing the whole document.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::document::lenient::strip_nulls;
use crate::document::models::{Language, ModuleConfig, Profile, ResumeDocument};
use crate::document::seed::seed_document;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Data core corrupted: not valid JSON ({0})")]
    Corrupted(#[source] serde_json::Error),

    #[error("Invalid data core structure: missing top-level `{0}`")]
    MissingField(&'static str),

    #[error("Invalid data core structure: `{0}` must be an object")]
    Incompatible(&'static str),
}

fn section<T: DeserializeOwned + Default>(key: &str, value: Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Dropping unreadable `{key}` ({e}), using defaults");
        T::default()
    })
}

fn records<T: DeserializeOwned>(root: &mut Map<String, Value>, key: &str) -> Vec<T> {
    match root.remove(key) {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Dropping unreadable {key}[{i}]: {e}");
                    None
                }
            })
            .collect(),
        Some(_) => {
            warn!("Dropping `{key}`: not a list");
            Vec::new()
        }
    }
}

/// Decodes a document, synthesizing `config` when absent and repairing it when present.
fn decode(raw: &str, required: &[&'static str]) -> Result<ResumeDocument, ImportError> {
    let mut value: Value = serde_json::from_str(raw).map_err(ImportError::Corrupted)?;

    for &field in required {
        if value.get(field).is_none() {
            return Err(ImportError::MissingField(field));
        }
    }

    strip_nulls(&mut value);
    let Value::Object(mut root) = value else {
        return Err(ImportError::Incompatible("document"));
    };
    let profile = match root.remove("profile") {
        Some(profile @ Value::Object(_)) => section::<Profile>("profile", profile),
        _ => return Err(ImportError::Incompatible("profile")),
    };

    let mut doc = ResumeDocument {
        profile,
        skills: records(&mut root, "skills"),
        experience: records(&mut root, "experience"),
        education: records(&mut root, "education"),
        projects: records(&mut root, "projects"),
        config: root
            .remove("config")
            .map(|config| section::<ModuleConfig>("config", config))
            .unwrap_or_default(),
    };
    doc.config.normalize();
    Ok(doc)
}

/// Reads the persisted slot contents. Anything unusable falls back to seed defaults for
/// `lang`; this never fails.
pub fn load(raw: Option<&str>, lang: Language) -> ResumeDocument {
    let Some(raw) = raw else {
        info!("No stored document, starting from {lang} seed defaults");
        return seed_document(lang);
    };

    match decode(raw, &["profile", "experience"]) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Stored document rejected ({e}), falling back to {lang} seed defaults");
            seed_document(lang)
        }
    }
}

/// Parses a user-supplied snapshot. Only `profile` is required.
pub fn import(raw: &[u8]) -> Result<ResumeDocument, ImportError> {
    let text = String::from_utf8_lossy(raw);
    decode(&text, &["profile"])
}

pub fn export_json(doc: &ResumeDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// `resume_<name>.json`, with whitespace runs turned into `_` and anything outside
/// `[A-Za-z0-9_.-]` dropped so the name is safe in a `Content-Disposition` header.
pub fn export_filename(profile_name: &str) -> String {
    let joined = profile_name.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();

    if cleaned.is_empty() {
        "resume.json".to_string()
    } else {
        format!("resume_{cleaned}.json")
    }
}
