//! Axum route handlers for the Enhancement API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::enhancement::enhancer::enhance_resume;
use crate::errors::AppError;
use crate::models::resume::{DraftResume, ResumeDocument};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub form_data: Option<DraftResume>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: ResumeDocument,
    pub message: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/resume/generate
///
/// Enhances the submitted draft into a canonical resume document.
pub async fn handle_generate(
    State(state): State<AppState>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = request.map_err(|e| AppError::Validation(e.body_text()))?;
    let draft = request
        .form_data
        .ok_or_else(|| AppError::Validation("Form data is required".to_string()))?;
    validate_draft(&draft)?;

    let span = info_span!("enhance_resume", request_id = %Uuid::new_v4());
    let document = enhance_resume(state.generator.as_ref(), &state.templates, &draft)
        .instrument(span)
        .await?;

    Ok(Json(GenerateResponse {
        success: true,
        data: document,
        message: "Resume generated successfully",
    }))
}

/// A draft needs at least a first name and an email before it is worth a model call.
fn validate_draft(draft: &DraftResume) -> Result<(), AppError> {
    let basics = &draft.basics;
    if basics.first_name.trim().is_empty() || basics.email.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and email are required".to_string(),
        ));
    }
    Ok(())
}
