//! Structural validation — maps the extracted model JSON onto the canonical
//! resume schema, repairing rather than rejecting.
//!
//! Policy summary:
//! - personalInfo: model values, falling back to the draft per field
//! - education: copied through when shaped as expected, else empty
//! - experience/projects: model bullets if at least 3 usable, else fallback synthesis;
//!   always normalized and capped at 4
//! - skills: fixed categories; `apis` is never left empty
//! - customSections: ALWAYS the draft's, never the model's
//! - metadata: always synthesized here

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::enhancement::bullets::{has_content, normalize_bullet, normalize_bullets};
use crate::enhancement::fallback::{
    fallback_bullets, EntryKind, FallbackTemplates, MAX_BULLETS, MIN_BULLETS,
};
use crate::errors::AppError;
use crate::models::resume::{
    coerce_string, DocumentMetadata, DraftBasics, DraftResume, EducationEntry, ExperienceEntry,
    PersonalInfo, ProjectEntry, ResumeDocument, Skills,
};

type Object = Map<String, Value>;

/// Builds the canonical document from the parsed model reply, stamped with the current time.
pub fn normalize_document(
    parsed: Value,
    draft: &DraftResume,
    templates: &FallbackTemplates,
) -> Result<ResumeDocument, AppError> {
    normalize_document_at(parsed, draft, templates, Utc::now())
}

/// As [`normalize_document`], with an explicit generation timestamp.
pub fn normalize_document_at(
    parsed: Value,
    draft: &DraftResume,
    templates: &FallbackTemplates,
    generated_at: DateTime<Utc>,
) -> Result<ResumeDocument, AppError> {
    let root = match parsed {
        Value::Object(root) => root,
        other => {
            return Err(AppError::InvalidDocumentShape(format!(
                "expected a JSON object at the top level, got {}",
                kind_of(&other)
            )))
        }
    };

    if root.contains_key("customSections") {
        debug!("Discarding model-provided customSections in favour of the draft's");
    }

    Ok(ResumeDocument {
        personal_info: personal_info(root.get("personalInfo"), &draft.basics),
        summary: None,
        education: education(root.get("education")),
        experience: experience(root.get("experience"), draft, templates),
        projects: projects(root.get("projects"), draft, templates),
        skills: skills(root.get("skills"), templates),
        custom_sections: draft.custom_sections.clone(),
        metadata: DocumentMetadata::fresh(generated_at),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Field groups
// ────────────────────────────────────────────────────────────────────────────

fn personal_info(value: Option<&Value>, basics: &DraftBasics) -> PersonalInfo {
    let empty = Object::new();
    let obj = value.and_then(Value::as_object).unwrap_or(&empty);

    let or_draft = |model: String, draft: &str| {
        if model.is_empty() {
            draft.trim().to_string()
        } else {
            model
        }
    };

    let mut links: BTreeMap<String, String> = basics
        .links
        .iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|(platform, url)| (platform.clone(), url.trim().to_string()))
        .collect();
    if let Some(Value::Object(model_links)) = obj.get("links") {
        for (platform, url) in model_links {
            if let Some(url) = url.as_str().map(str::trim).filter(|u| !u.is_empty()) {
                links.insert(platform.clone(), url.to_string());
            }
        }
    }

    PersonalInfo {
        name: or_draft(str_field(obj, "name"), &basics.full_name()),
        email: or_draft(str_field(obj, "email"), &basics.email),
        phone: or_draft(str_field(obj, "phone"), &basics.phone),
        links,
    }
}

fn education(value: Option<&Value>) -> Vec<EducationEntry> {
    objects(value, "education")
        .map(|(_, obj)| EducationEntry {
            institution: str_field(obj, "institution"),
            degree: str_field(obj, "degree"),
            dates: str_field(obj, "dates"),
            details: opt_str_field(obj, "details"),
        })
        .collect()
}

fn experience(
    value: Option<&Value>,
    draft: &DraftResume,
    templates: &FallbackTemplates,
) -> Vec<ExperienceEntry> {
    objects(value, "experience")
        .map(|(index, obj)| {
            let source = draft.experience.get(index);
            let company = str_field(obj, "company");
            let identifier = if company.is_empty() {
                source.map(|s| s.company.as_str()).unwrap_or_default()
            } else {
                company.as_str()
            };
            let description = entry_bullets(
                EntryKind::Experience,
                index,
                identifier,
                obj.get("description"),
                source.and_then(|s| s.description.as_deref()),
                templates,
            );
            ExperienceEntry {
                position: str_field(obj, "position"),
                dates: str_field(obj, "dates"),
                description,
                company,
            }
        })
        .collect()
}

fn projects(
    value: Option<&Value>,
    draft: &DraftResume,
    templates: &FallbackTemplates,
) -> Vec<ProjectEntry> {
    objects(value, "projects")
        .map(|(index, obj)| {
            let source = draft.projects.get(index);
            let name = str_field(obj, "name");
            let identifier = if name.is_empty() {
                source.map(|s| s.name.as_str()).unwrap_or_default()
            } else {
                name.as_str()
            };
            let description = entry_bullets(
                EntryKind::Project,
                index,
                identifier,
                obj.get("description"),
                source.and_then(|s| s.description.as_deref()),
                templates,
            );
            ProjectEntry {
                description,
                technologies: string_list(obj.get("technologies")),
                link: opt_str_field(obj, "link"),
                dates: str_field(obj, "dates"),
                name,
            }
        })
        .collect()
}

fn skills(value: Option<&Value>, templates: &FallbackTemplates) -> Skills {
    let mut skills = Skills::default();

    if let Some(Value::Object(categories)) = value {
        for (key, values) in categories {
            match skills.category_mut(&key.to_ascii_lowercase()) {
                Some(slot) => *slot = string_list(Some(values)),
                None => debug!(category = %key, "Ignoring unknown skill category"),
            }
        }
    }

    if skills.apis.is_empty() {
        skills.apis = templates
            .default_apis
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }

    skills
}

/// Picks the model's bullets when it produced enough usable ones, otherwise
/// synthesizes them. Either way the result is normalized and holds 3–4 bullets.
fn entry_bullets(
    kind: EntryKind,
    index: usize,
    identifier: &str,
    model_description: Option<&Value>,
    draft_description: Option<&str>,
    templates: &FallbackTemplates,
) -> Vec<String> {
    let model_bullets: Vec<String> = match model_description {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(normalize_bullet)
            .filter(|b| has_content(b))
            .collect(),
        _ => Vec::new(),
    };

    let bullets = if model_bullets.len() >= MIN_BULLETS {
        model_bullets
    } else {
        warn!(
            kind = ?kind,
            index,
            model_bullets = model_bullets.len(),
            "Model description too thin; synthesizing fallback bullets"
        );
        normalize_bullets(&fallback_bullets(kind, identifier, draft_description, templates))
            .into_iter()
            .filter(|b| has_content(b))
            .collect()
    };

    bullets.into_iter().take(MAX_BULLETS).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient accessors
// ────────────────────────────────────────────────────────────────────────────

/// Object elements of an array field, with their original index. Anything
/// that isn't an array yields nothing; non-object elements are skipped.
fn objects<'a>(
    value: Option<&'a Value>,
    field: &'static str,
) -> impl Iterator<Item = (usize, &'a Object)> + 'a {
    let items: &'a [Value] = match value {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(field, got = kind_of(other), "Expected an array; treating as empty");
            &[]
        }
        None => &[],
    };
    items.iter().enumerate().filter_map(move |(index, item)| match item {
        Value::Object(obj) => Some((index, obj)),
        other => {
            warn!(field, index, got = kind_of(other), "Skipping non-object entry");
            None
        }
    })
}

fn str_field(obj: &Object, key: &str) -> String {
    obj.get(key)
        .map(coerce_string)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn opt_str_field(obj: &Object, key: &str) -> Option<String> {
    Some(str_field(obj, key)).filter(|s| !s.is_empty())
}

/// Accepts an array of scalars or a single comma-separated string.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::Array(items)) => items.iter().map(coerce_string).collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancement::bullets::BULLET_MARKER;
    use crate::models::resume::{CustomSection, DraftExperience, DraftProject, SCHEMA_VERSION};
    use chrono::TimeZone;
    use serde_json::json;

    fn draft() -> DraftResume {
        serde_json::from_value(json!({
            "basics": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "555-0100",
                "links": { "github": "https://github.com/ada", "blog": "" }
            },
            "experience": [
                { "company": "Engines Ltd", "role": "Engineer", "dates": "2020-2022",
                  "description": "Built an API. Deployed it. Wrote tests." }
            ],
            "projects": [
                { "name": "Ledger", "description": "Tracked expenses." }
            ],
            "customSections": [
                { "title": "Awards", "items": ["Best Paper 2021", "Dean's List"] }
            ]
        }))
        .unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn normalize(value: Value) -> ResumeDocument {
        normalize_document_at(value, &draft(), &FallbackTemplates::default(), at()).unwrap()
    }

    fn assert_bullet_invariants(bullets: &[String]) {
        assert!(
            (MIN_BULLETS..=MAX_BULLETS).contains(&bullets.len()),
            "bullet count {} out of range: {bullets:?}",
            bullets.len()
        );
        for bullet in bullets {
            assert!(bullet.starts_with("● "), "missing marker: {bullet:?}");
            let body = &bullet[BULLET_MARKER.len_utf8() + 1..];
            assert!(!body.starts_with(BULLET_MARKER));
            assert!(!body.contains('•'));
            assert!(!bullet.contains("  "));
        }
    }

    #[test]
    fn test_non_object_top_level_is_invalid_shape() {
        for value in [json!([1, 2]), json!("text"), json!(null), json!(3)] {
            let err = normalize_document_at(value, &draft(), &FallbackTemplates::default(), at())
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidDocumentShape(_)));
        }
    }

    #[test]
    fn test_empty_object_yields_fully_populated_document() {
        let doc = normalize(json!({}));
        assert_eq!(doc.personal_info.name, "Ada Lovelace");
        assert_eq!(doc.personal_info.email, "ada@example.com");
        assert_eq!(doc.personal_info.phone, "555-0100");
        assert!(doc.education.is_empty());
        assert!(doc.experience.is_empty());
        assert!(doc.projects.is_empty());
        assert_eq!(doc.skills.apis, FallbackTemplates::default().default_apis);
        assert_eq!(doc.metadata.version, SCHEMA_VERSION);
        assert_eq!(doc.metadata.generated_at, at());
    }

    #[test]
    fn test_missing_model_description_uses_draft_sentences() {
        let doc = normalize(json!({
            "experience": [{ "company": "Engines Ltd", "position": "Engineer", "dates": "2020-2022" }]
        }));
        assert_eq!(
            doc.experience[0].description,
            vec!["● Built an API", "● Deployed it", "● Wrote tests"]
        );
    }

    #[test]
    fn test_short_model_description_is_replaced_entirely() {
        let doc = normalize(json!({
            "projects": [{ "name": "Ledger", "description": ["● Only one bullet", "● And two"] }]
        }));
        let bullets = &doc.projects[0].description;
        assert_bullet_invariants(bullets);
        assert_eq!(bullets[0], "● Tracked expenses");
        assert!(!bullets.iter().any(|b| b.contains("Only one bullet")));
    }

    #[test]
    fn test_non_array_description_triggers_fallback() {
        let doc = normalize(json!({
            "experience": [{ "company": "Engines Ltd", "description": "one string" }]
        }));
        assert_eq!(doc.experience[0].description.len(), 3);
        assert_bullet_invariants(&doc.experience[0].description);
    }

    #[test]
    fn test_sufficient_model_bullets_are_kept_and_cleaned() {
        let doc = normalize(json!({
            "experience": [{
                "company": "Engines Ltd",
                "description": ["• Cut p99 latency by 40%", "%Ï  Migrated to Postgres", "- Mentored 3 interns"]
            }]
        }));
        assert_eq!(
            doc.experience[0].description,
            vec![
                "● Cut p99 latency by 40%",
                "● Migrated to Postgres",
                "● Mentored 3 interns"
            ]
        );
    }

    #[test]
    fn test_overlong_model_description_is_capped_at_four() {
        let doc = normalize(json!({
            "projects": [{ "name": "Ledger", "description": ["a", "b", "c", "d", "e", "f"] }]
        }));
        assert_eq!(doc.projects[0].description, vec!["● a", "● b", "● c", "● d"]);
    }

    #[test]
    fn test_blank_model_bullets_do_not_count() {
        let doc = normalize(json!({
            "projects": [{ "name": "Ledger", "description": ["● real", "", "  •  "] }]
        }));
        assert!(!doc.projects[0].description.contains(&"● real".to_string()));
        assert_bullet_invariants(&doc.projects[0].description);
    }

    #[test]
    fn test_entries_without_draft_counterpart_use_templates() {
        let doc = normalize(json!({
            "projects": [
                { "name": "Ledger", "description": ["x", "y", "z"] },
                { "name": "Extra" }
            ]
        }));
        assert_eq!(
            doc.projects[1].description[0],
            "● Developed Extra from initial design through deployment"
        );
        assert_bullet_invariants(&doc.projects[1].description);
    }

    #[test]
    fn test_custom_sections_always_come_from_draft() {
        let doc = normalize(json!({
            "customSections": [{ "title": "Fabricated", "items": ["Nobel Prize"] }]
        }));
        assert_eq!(doc.custom_sections, draft().custom_sections);
        assert_eq!(
            doc.custom_sections[0],
            CustomSection {
                title: "Awards".to_string(),
                items: vec!["Best Paper 2021".to_string(), "Dean's List".to_string()],
            }
        );
    }

    #[test]
    fn test_model_metadata_is_ignored() {
        let doc = normalize(json!({ "metadata": { "version": "9.9", "generatedAt": "1999-01-01T00:00:00Z" } }));
        assert_eq!(doc.metadata, DocumentMetadata::fresh(at()));
    }

    #[test]
    fn test_personal_info_prefers_model_but_fills_gaps_from_draft() {
        let doc = normalize(json!({
            "personalInfo": {
                "name": "Augusta Ada King",
                "email": "",
                "links": { "github": "", "linkedin": "https://linkedin.com/in/ada" }
            }
        }));
        let info = doc.personal_info;
        assert_eq!(info.name, "Augusta Ada King");
        assert_eq!(info.email, "ada@example.com");
        assert_eq!(info.links["github"], "https://github.com/ada");
        assert_eq!(info.links["linkedin"], "https://linkedin.com/in/ada");
        assert!(!info.links.contains_key("blog"));
    }

    #[test]
    fn test_education_is_copied_through() {
        let doc = normalize(json!({
            "education": [
                { "institution": "MIT", "degree": "BSc", "dates": 2024, "details": "Coursework: OS" },
                { "institution": "Stanford", "degree": "MSc", "dates": "2026", "details": "" },
                "not an object"
            ]
        }));
        assert_eq!(doc.education.len(), 2);
        assert_eq!(doc.education[0].dates, "2024");
        assert_eq!(doc.education[0].details.as_deref(), Some("Coursework: OS"));
        assert_eq!(doc.education[1].details, None);
    }

    #[test]
    fn test_education_of_wrong_shape_becomes_empty() {
        let doc = normalize(json!({ "education": { "institution": "MIT" } }));
        assert!(doc.education.is_empty());
    }

    #[test]
    fn test_skills_keep_model_apis_and_ignore_unknown_categories() {
        let doc = normalize(json!({
            "skills": {
                "Languages": ["Rust", "Go"],
                "tools": "Git, Docker",
                "apis": ["Stripe"],
                "soft": ["Teamwork"]
            }
        }));
        assert_eq!(doc.skills.languages, vec!["Rust", "Go"]);
        assert_eq!(doc.skills.tools, vec!["Git", "Docker"]);
        assert_eq!(doc.skills.apis, vec!["Stripe"]);
    }

    #[test]
    fn test_empty_apis_are_filled_with_defaults() {
        let doc = normalize(json!({ "skills": { "apis": [] } }));
        assert_eq!(doc.skills.apis.len(), 3);
    }

    #[test]
    fn test_project_fields_are_mapped() {
        let doc = normalize(json!({
            "projects": [{
                "name": "Ledger",
                "description": ["a", "b", "c"],
                "technologies": ["Rust", "", "Axum"],
                "link": "",
                "dates": "2023"
            }]
        }));
        let project = &doc.projects[0];
        assert_eq!(project.technologies, vec!["Rust", "Axum"]);
        assert_eq!(project.link, None);
        assert_eq!(project.dates, "2023");
    }

    #[test]
    fn test_every_entry_satisfies_bullet_invariants() {
        let draft = DraftResume {
            experience: vec![DraftExperience::default(); 3],
            projects: vec![DraftProject {
                description: Some("Solo sentence".to_string()),
                ..Default::default()
            }],
            ..draft()
        };
        let doc = normalize_document_at(
            json!({
                "experience": [
                    {},
                    { "description": null },
                    { "description": ["▪️ one", "* two", "•three", "four", "five"] }
                ],
                "projects": [{ "description": [1, 2, 3] }]
            }),
            &draft,
            &FallbackTemplates::default(),
            at(),
        )
        .unwrap();

        for entry in &doc.experience {
            assert_bullet_invariants(&entry.description);
        }
        for entry in &doc.projects {
            assert_bullet_invariants(&entry.description);
        }
        assert!(!doc.skills.apis.is_empty());
    }

    #[test]
    fn test_repetitive_templates_keep_description_in_range() {
        let templates = FallbackTemplates {
            experience: vec![
                "Fixed bugs".to_string(),
                "• Fixed bugs".to_string(),
                "Fixed bugs".to_string(),
            ],
            ..FallbackTemplates::default()
        };
        let draft = DraftResume {
            experience: vec![DraftExperience {
                description: Some("Shipped v2.".to_string()),
                ..Default::default()
            }],
            ..draft()
        };
        let doc = normalize_document_at(json!({ "experience": [{}] }), &draft, &templates, at())
            .unwrap();

        assert_bullet_invariants(&doc.experience[0].description);
        assert_eq!(doc.experience[0].description[0], "● Shipped v2");
    }
}
