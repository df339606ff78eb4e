//! Response extraction — best-effort recovery of a JSON object from the
//! model's free-form reply.
//!
//! Only the two defect classes seen from the upstream model are repaired
//! (trailing commas, typographic quotes). This is not a general JSON fixer.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;

/// Locates the outermost `{ … }` span in `raw`, repairs it, and parses it.
///
/// Fails with `NoStructuredContent` when there is no `{ … }` span, and with
/// `MalformedStructuredContent` when the repaired candidate does not parse.
pub fn extract_json(raw: &str) -> Result<Value, AppError> {
    let candidate = locate_candidate(raw).ok_or(AppError::NoStructuredContent)?;
    let repaired = repair(candidate);

    if repaired.len() != candidate.len() {
        debug!(
            original_len = candidate.len(),
            repaired_len = repaired.len(),
            "Applied textual repairs to model JSON"
        );
    }

    serde_json::from_str(&repaired).map_err(|e| AppError::MalformedStructuredContent(e.to_string()))
}

/// First `{` through last `}`, inclusive.
fn locate_candidate(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn repair(candidate: &str) -> String {
    let without_trailing_commas = trailing_comma_pattern().replace_all(candidate, "$1");
    without_trailing_commas
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

fn trailing_comma_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern is valid"))
}
