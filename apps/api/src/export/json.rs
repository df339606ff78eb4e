//! JSON export: the canonical document, pretty-printed.

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;

pub fn render(document: &ResumeDocument) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(document)
        .map_err(|e| AppError::RenderFailure(format!("JSON serialization failed: {e}")))
}
