//! Resume Enhancement — orchestrates the pipeline.
//!
//! Flow: build prompt → generate → extract JSON → normalize → canonical document.
//!
//! Each stage either hands the next one a value or returns a named error;
//! no partial document ever leaves this function.

use tracing::{info, warn};

use crate::enhancement::extractor::extract_json;
use crate::enhancement::fallback::FallbackTemplates;
use crate::enhancement::normalizer::normalize_document;
use crate::enhancement::prompts::build_enhancement_prompt;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::resume::{DraftResume, ResumeDocument};

/// Runs one enhancement request end to end.
///
/// The only await point is the generator call. Everything after it is pure.
pub async fn enhance_resume(
    generator: &dyn TextGenerator,
    templates: &FallbackTemplates,
    draft: &DraftResume,
) -> Result<ResumeDocument, AppError> {
    let prompt = build_enhancement_prompt(draft);
    info!(
        model = generator.model(),
        prompt_chars = prompt.len(),
        experience = draft.experience.len(),
        projects = draft.projects.len(),
        "Requesting resume enhancement"
    );

    let raw = generator.generate(&prompt).await.map_err(|e| {
        warn!("Enhancement call failed: {e}");
        AppError::from(e)
    })?;

    let parsed = extract_json(&raw).map_err(|e| {
        warn!(reply_chars = raw.len(), "Could not extract JSON from model reply: {e}");
        e
    })?;

    let document = normalize_document(parsed, draft, templates)?;

    info!(
        education = document.education.len(),
        experience = document.experience.len(),
        projects = document.projects.len(),
        custom_sections = document.custom_sections.len(),
        "Resume enhancement complete"
    );

    Ok(document)
}
