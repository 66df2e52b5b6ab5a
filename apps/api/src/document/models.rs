use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::lenient::{i32_or_zero, u32_or_zero};

/// Display language. Selects seed content, local labels, and is forwarded to the assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// Addressable display sections. Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionId {
    Stats,
    Timeline,
    Education,
    Projects,
}

impl SectionId {
    pub const ALL: [SectionId; 4] = [
        SectionId::Stats,
        SectionId::Timeline,
        SectionId::Education,
        SectionId::Projects,
    ];
}

/// Known categories plus whatever else the data carries, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Frontend,
    Backend,
    Design,
    #[default]
    Tools,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub github: String,
    pub linkedin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// The six radar-chart attributes, each 0 – 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(deserialize_with = "u32_or_zero")]
    pub intelligence: u32,
    #[serde(deserialize_with = "u32_or_zero")]
    pub creativity: u32,
    #[serde(deserialize_with = "u32_or_zero")]
    pub endurance: u32,
    #[serde(deserialize_with = "u32_or_zero")]
    pub charisma: u32,
    #[serde(deserialize_with = "u32_or_zero")]
    pub agility: u32,
    #[serde(deserialize_with = "u32_or_zero")]
    pub luck: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub title: String,
    /// Years of experience.
    #[serde(deserialize_with = "u32_or_zero")]
    pub level: u32,
    pub bio: String,
    pub contact: Contact,
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    /// 0 – 100
    #[serde(deserialize_with = "u32_or_zero")]
    pub level: u32,
    pub category: SkillCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: String,
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(deserialize_with = "i32_or_zero")]
    pub year: i32,
    pub description: String,
    pub achievements: Vec<String>,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub id: String,
    pub school: String,
    pub degree: String,
    #[serde(deserialize_with = "i32_or_zero")]
    pub year: i32,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tech: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Which sections are shown, and in what order.
///
/// Every `SectionId` lives in exactly one of the two lists and `modules` never repeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    #[serde(default)]
    pub modules: Vec<SectionId>,
    #[serde(default)]
    pub hidden_modules: Vec<SectionId>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            modules: SectionId::ALL.to_vec(),
            hidden_modules: Vec::new(),
        }
    }
}

/// The whole resume. One instance per process, owned by the `Store`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub profile: Profile,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub config: ModuleConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_ids_serialize_uppercase() {
        let json = serde_json::to_string(&SectionId::ALL).unwrap();
        assert_eq!(json, r#"["STATS","TIMELINE","EDUCATION","PROJECTS"]"#);
    }

    #[test]
    fn test_experience_uses_camel_case_keys() {
        let entry = ExperienceEntry {
            tech_stack: vec!["Rust".to_string()],
            ..Default::default()
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["techStack"][0], "Rust");
    }

    #[test]
    fn test_partial_records_take_defaults() {
        let skill: Skill = serde_json::from_str(r#"{"name": "Go"}"#).unwrap();
        assert_eq!(skill.level, 0);
        assert_eq!(skill.category, SkillCategory::Tools);
    }

    #[test]
    fn test_unknown_skill_category_round_trips() {
        let skill: Skill =
            serde_json::from_str(r#"{"name": "K8s", "level": 60, "category": "devops"}"#).unwrap();
        assert_eq!(skill.category, SkillCategory::Other("devops".to_string()));
        assert_eq!(serde_json::to_value(&skill).unwrap()["category"], "devops");

        let known: Skill = serde_json::from_str(r#"{"category": "backend"}"#).unwrap();
        assert_eq!(known.category, SkillCategory::Backend);
    }

    #[test]
    fn test_numeric_fields_tolerate_loose_values() {
        let skill: Skill = serde_json::from_str(r#"{"name": "Go", "level": 85.5}"#).unwrap();
        assert_eq!(skill.level, 86);

        let entry: EducationEntry = serde_json::from_str(r#"{"year": "2019"}"#).unwrap();
        assert_eq!(entry.year, 2019);

        let stats: Stats = serde_json::from_str(r#"{"luck": null, "agility": 70}"#).unwrap();
        assert_eq!(stats.luck, 0);
        assert_eq!(stats.agility, 70);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("ZH".parse::<Language>().unwrap(), Language::Zh);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_optional_contact_fields_omitted() {
        let value = serde_json::to_value(Contact::default()).unwrap();
        assert!(value.get("phone").is_none());
        assert!(value.get("location").is_none());
    }
}
