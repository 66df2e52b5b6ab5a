//! Patch Extraction: pulls a proposed mutation out of a free-text assistant reply.
//!
//! Two stages:
//! 1. Lenient scan for a fenced block (` ```json ` preferred, any ` ``` ` otherwise).
//! 2. Strict parse of its body as `{"type": <tag>, "data": <payload>}`.
//!
//! Any failure degrades to plain chat: no patch, raw text shown verbatim. The tag is not
//! checked against the mutation vocabulary here; the dispatcher decides what it means.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::document::models::Language;
use crate::document::seed::labels;

static TAGGED_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid regex"));
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*([\s\S]*?)\s*```").expect("valid regex"));

/// A proposed mutation waiting for the user's go-ahead. Never modified once staged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedPatch {
    #[serde(rename = "type")]
    pub mutation_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// What the user sees.
    pub text: String,
    pub patch: Option<StagedPatch>,
}

impl Extraction {
    fn plain(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            patch: None,
        }
    }
}

pub fn extract_patch(raw: &str, lang: Language) -> Extraction {
    let Some(captures) = TAGGED_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
    else {
        return Extraction::plain(raw);
    };

    let (Some(block), Some(body)) = (captures.get(0), captures.get(1)) else {
        return Extraction::plain(raw);
    };

    let patch: StagedPatch = match serde_json::from_str(body.as_str()) {
        Ok(patch) => patch,
        Err(e) => {
            debug!("Fenced block is not a patch, showing reply as plain text: {e}");
            return Extraction::plain(raw);
        }
    };

    let remainder = format!("{}{}", &raw[..block.start()], &raw[block.end()..]);
    let remainder = remainder.trim();
    let text = if remainder.is_empty() {
        labels(lang).update_available.to_string()
    } else {
        remainder.to_string()
    };

    Extraction {
        text,
        patch: Some(patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_tagged_block() {
        let raw = "Sure, here:\n```json\n{\"type\":\"UPDATE_SKILLS\",\"data\":[{\"name\":\"Go\",\"level\":80,\"category\":\"backend\"}]}\n```";
        let extraction = extract_patch(raw, Language::En);

        assert_eq!(extraction.text, "Sure, here:");
        let patch = extraction.patch.unwrap();
        assert_eq!(patch.mutation_type, "UPDATE_SKILLS");
        assert_eq!(
            patch.data,
            json!([{ "name": "Go", "level": 80, "category": "backend" }])
        );
    }

    #[test]
    fn test_no_block_is_plain_text() {
        let raw = "Your strongest skill is TypeScript.";
        let extraction = extract_patch(raw, Language::En);
        assert_eq!(extraction.text, raw);
        assert!(extraction.patch.is_none());
    }

    #[test]
    fn test_invalid_json_in_block_is_plain_text() {
        let raw = "Try this:\n```json\n{\"type\": \"UPDATE_PROFILE\", \"data\": {oops}\n```";
        let extraction = extract_patch(raw, Language::En);
        assert_eq!(extraction.text, raw);
        assert!(extraction.patch.is_none());
    }

    #[test]
    fn test_block_without_type_is_plain_text() {
        let raw = "```json\n{\"bio\": \"hello\"}\n```";
        assert!(extract_patch(raw, Language::En).patch.is_none());
    }

    #[test]
    fn test_untagged_block_is_fallback() {
        let raw = "Done.\n```\n{\"type\": \"UPDATE_PROFILE\", \"data\": {\"bio\": \"New\"}}\n```\nAnything else?";
        let extraction = extract_patch(raw, Language::En);
        assert_eq!(extraction.text, "Done.\n\nAnything else?");
        assert_eq!(extraction.patch.unwrap().data, json!({ "bio": "New" }));
    }

    #[test]
    fn test_tagged_block_preferred_over_earlier_untagged() {
        let raw = "```\nnot json\n```\nthen\n```json\n{\"type\": \"UPDATE_PROJECTS\", \"data\": []}\n```";
        let extraction = extract_patch(raw, Language::En);
        assert_eq!(extraction.patch.unwrap().mutation_type, "UPDATE_PROJECTS");
        assert_eq!(extraction.text, "```\nnot json\n```\nthen");
    }

    #[test]
    fn test_block_only_gets_localized_placeholder() {
        let raw = "```json\n{\"type\": \"UPDATE_SKILLS\", \"data\": []}\n```";
        assert_eq!(
            extract_patch(raw, Language::En).text,
            "System Update Available"
        );
        assert_eq!(extract_patch(raw, Language::Zh).text, "可用系统更新");
    }

    #[test]
    fn test_missing_data_defaults_to_null() {
        let raw = "```json\n{\"type\": \"UPDATE_SKILLS\"}\n```";
        let patch = extract_patch(raw, Language::En).patch.unwrap();
        assert_eq!(patch.data, Value::Null);
    }

    #[test]
    fn test_unknown_tag_still_staged() {
        let raw = "```json\n{\"type\": \"UPDATE_HOROSCOPE\", \"data\": 1}\n```";
        let patch = extract_patch(raw, Language::En).patch.unwrap();
        assert_eq!(patch.mutation_type, "UPDATE_HOROSCOPE");
    }
}
