//! Fallback bullet synthesis — deterministic, non-AI bullets for entries where
//! the model's description is absent or too thin.
//!
//! Never fails: it exists so a thin model reply degrades to generic content
//! instead of surfacing an error.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::enhancement::bullets::{has_content, normalize_bullet, BULLET_MARKER};

/// Minimum and maximum bullets per experience/project entry.
pub const MIN_BULLETS: usize = 3;
pub const MAX_BULLETS: usize = 4;

/// Placeholder substituted with the entry's identifying field.
const NAME_PLACEHOLDER: &str = "{name}";

/// Which list an entry belongs to. Each kind has its own template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Experience,
    Project,
}

impl EntryKind {
    /// Stand-in for an empty identifying field.
    fn default_identifier(self) -> &'static str {
        match self {
            EntryKind::Experience => "projects",
            EntryKind::Project => "application",
        }
    }
}

/// Template content used when a model reply under-delivers.
///
/// Loaded once at startup (defaults, or a JSON override file) and shared
/// read-only across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackTemplates {
    /// Experience bullets. `{name}` is replaced with the company.
    pub experience: Vec<String>,
    /// Project bullets. `{name}` is replaced with the project name.
    pub project: Vec<String>,
    /// Used when the model returns no `skills.apis` entries.
    pub default_apis: Vec<String>,
}

impl Default for FallbackTemplates {
    fn default() -> Self {
        Self {
            experience: vec![
                "Contributed to {name} across the full development lifecycle".to_string(),
                "Collaborated with cross-functional teammates to deliver features on schedule"
                    .to_string(),
                "Improved reliability by diagnosing and resolving production issues".to_string(),
                "Maintained code quality through reviews, testing, and version control"
                    .to_string(),
            ],
            project: vec![
                "Developed {name} from initial design through deployment".to_string(),
                "Implemented core features with a focus on maintainable architecture"
                    .to_string(),
                "Tested and refined functionality to improve performance and usability"
                    .to_string(),
                "Documented setup and usage to support future contributors".to_string(),
            ],
            default_apis: vec![
                "REST APIs".to_string(),
                "JSON Web APIs".to_string(),
                "Third-party integrations".to_string(),
            ],
        }
    }
}

impl FallbackTemplates {
    /// Reads a template override file and checks it can uphold the 3–4 bullet contract.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fallback templates {}", path.display()))?;
        let templates: FallbackTemplates = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid fallback templates JSON in {}", path.display()))?;
        templates.validate()?;
        info!(path = %path.display(), "Loaded fallback bullet templates");
        Ok(templates)
    }

    pub fn validate(&self) -> Result<()> {
        for (kind, set) in [("experience", &self.experience), ("project", &self.project)] {
            ensure!(
                (MIN_BULLETS..=MAX_BULLETS).contains(&set.len()),
                "Fallback template set '{kind}' must have {MIN_BULLETS}-{MAX_BULLETS} entries, got {}",
                set.len()
            );
            ensure!(
                set.iter().all(|t| has_content(&normalize_bullet(t))),
                "Fallback template set '{kind}' contains an empty entry"
            );
            let mut seen = HashSet::new();
            ensure!(
                set.iter().all(|t| seen.insert(normalize_bullet(t))),
                "Fallback template set '{kind}' contains duplicate entries"
            );
        }
        ensure!(
            self.default_apis.iter().any(|a| !a.trim().is_empty()),
            "defaultApis must contain at least one entry"
        );
        Ok(())
    }

    fn for_kind(&self, kind: EntryKind) -> &[String] {
        match kind {
            EntryKind::Experience => &self.experience,
            EntryKind::Project => &self.project,
        }
    }
}

/// Produces 3–4 marker-prefixed bullets for an entry.
///
/// With a non-empty `original_description`, each sentence becomes one bullet
/// (first four kept); short descriptions are topped up from the templates.
/// Otherwise the kind's template set is returned with `{name}` filled in.
pub fn fallback_bullets(
    kind: EntryKind,
    identifier: &str,
    original_description: Option<&str>,
    templates: &FallbackTemplates,
) -> Vec<String> {
    let template_bullets = render_templates(kind, identifier, templates);

    let mut bullets: Vec<String> = original_description
        .map(split_sentences)
        .unwrap_or_default()
        .into_iter()
        .take(MAX_BULLETS)
        .map(|s| format!("{BULLET_MARKER} {s}"))
        .collect();

    if bullets.is_empty() {
        return template_bullets;
    }

    for template in &template_bullets {
        if bullets.len() >= MIN_BULLETS {
            break;
        }
        if !bullets.contains(template) {
            bullets.push(template.clone());
        }
    }

    // Unvalidated sets may repeat themselves; the minimum still holds.
    for template in template_bullets.iter().cycle() {
        if bullets.len() >= MIN_BULLETS {
            break;
        }
        bullets.push(template.clone());
    }

    bullets
}

fn render_templates(kind: EntryKind, identifier: &str, templates: &FallbackTemplates) -> Vec<String> {
    let identifier = match identifier.trim() {
        "" => kind.default_identifier(),
        name => name,
    };
    templates
        .for_kind(kind)
        .iter()
        .take(MAX_BULLETS)
        .map(|t| normalize_bullet(&t.replace(NAME_PLACEHOLDER, identifier)))
        .collect()
}

/// Splits prose into trimmed sentences. A sentence ends at `.`, `!` or `?`
/// followed by whitespace or end of text, so "Node.js" stays whole.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let terminates =
            matches!(c, '.' | '!' | '?') && chars.peek().map_or(true, |next| next.is_whitespace());
        if terminates {
            push_sentence(&mut sentences, &current);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
    let collapsed = fragment.split_whitespace().collect::<Vec<_>>().join(" ");
    // Runs like "..." leave punctuation-only fragments behind.
    if collapsed.chars().any(|c| c.is_alphanumeric()) {
        sentences.push(collapsed);
    }
}
