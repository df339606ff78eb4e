//! Resume data shapes: the user-authored draft and the canonical document
//! produced by the enhancement pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Version tag stamped into every canonical document's metadata.
pub const SCHEMA_VERSION: &str = "3.0";

// ────────────────────────────────────────────────────────────────────────────
// Draft resume (form layer input)
// ────────────────────────────────────────────────────────────────────────────

/// The raw, possibly incomplete resume collected by the form layer.
///
/// Every field is optional on the wire; missing values deserialize to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftResume {
    #[serde(alias = "personal")]
    pub basics: DraftBasics,
    pub education: Vec<DraftEducation>,
    pub experience: Vec<DraftExperience>,
    #[serde(alias = "project")]
    pub projects: Vec<DraftProject>,
    pub skills: Vec<DraftSkill>,
    pub custom_sections: Vec<CustomSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftBasics {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    /// Platform name → URL. Ordered so prompts and renders are deterministic.
    #[serde(deserialize_with = "lenient_links")]
    pub links: BTreeMap<String, String>,
}

impl DraftBasics {
    /// "First Last", trimmed. Empty when both parts are empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftEducation {
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dates: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dates: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftProject {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dates: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftSkill {
    #[serde(alias = "skillName", alias = "name", deserialize_with = "lenient_string")]
    pub skillname: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// A user-authored free-form section. Passed through to the canonical
/// document untouched; the model never gets to rewrite it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSection {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_items")]
    pub items: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical resume document (pipeline output)
// ────────────────────────────────────────────────────────────────────────────

/// The validated, schema-conformant resume. Built once per enhancement request
/// and read-only afterwards. Also accepted from callers on the export endpoint,
/// so deserialization is lenient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    /// Never produced by the enhancement pipeline; rendered when a caller supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub skills: Skills,
    pub custom_sections: Vec<CustomSection>,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub links: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub dates: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub dates: String,
    /// 3–4 bullets, each starting with the canonical marker.
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub name: String,
    /// 3–4 bullets, each starting with the canonical marker.
    pub description: Vec<String>,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub dates: String,
}

/// Skills grouped under fixed category keys. Field order is the serialization
/// order and the render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub tools: Vec<String>,
    pub databases: Vec<String>,
    pub apis: Vec<String>,
}

impl Skills {
    /// `(category key, values)` pairs in fixed order.
    pub fn categories(&self) -> [(&'static str, &[String]); 5] {
        [
            ("languages", self.languages.as_slice()),
            ("frameworks", self.frameworks.as_slice()),
            ("tools", self.tools.as_slice()),
            ("databases", self.databases.as_slice()),
            ("apis", self.apis.as_slice()),
        ]
    }

    pub fn category_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        match key {
            "languages" => Some(&mut self.languages),
            "frameworks" => Some(&mut self.frameworks),
            "tools" => Some(&mut self.tools),
            "databases" => Some(&mut self.databases),
            "apis" => Some(&mut self.apis),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, values)| values.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

impl DocumentMetadata {
    pub fn fresh(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient scalar handling
// ────────────────────────────────────────────────────────────────────────────

/// Renders a JSON scalar as a string: strings verbatim, numbers and booleans
/// via their display form, everything else as empty.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Form payloads occasionally carry `null` or numbers where text is expected.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string(&value))
}

/// Link maps keep only entries whose value coerces to text; anything that is
/// not an object reads as no links.
fn lenient_links<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let links = match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(platform, url)| (platform, coerce_string(&url)))
            .filter(|(_, url)| !url.is_empty())
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(links)
}

/// Item lists drop `null`s and coerce scalars; a lone string is one item.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .iter()
            .map(coerce_string)
            .filter(|item| !item.is_empty())
            .collect(),
        Value::String(item) if !item.is_empty() => vec![item],
        _ => Vec::new(),
    };
    Ok(items)
}
