//! Axum route handlers for the Export API.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{render_export, ExportArtifact, ExportFormat};
use crate::models::resume::ResumeDocument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub resume_data: Option<ResumeDocument>,
    pub format: Option<String>,
}

/// POST /api/export/download
///
/// Renders the supplied document and returns it as an attachment.
pub async fn handle_download(
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = request.map_err(|e| AppError::Validation(e.body_text()))?;
    let (Some(document), Some(format)) = (
        request.resume_data,
        request.format.filter(|f| !f.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Resume data and format are required".to_string(),
        ));
    };
    let format: ExportFormat = format.parse()?;

    let span = info_span!("export_resume", request_id = %Uuid::new_v4(), %format);
    let artifact = async move {
        // CPU-bound rendering — spawn_blocking to avoid blocking the async executor.
        let artifact = tokio::task::spawn_blocking(move || render_export(&document, format))
            .await
            .map_err(|e| AppError::RenderFailure(format!("spawn_blocking failed in export: {e}")))??;
        info!(
            bytes = artifact.bytes.len(),
            filename = %artifact.filename,
            "Resume exported"
        );
        Ok::<_, AppError>(artifact)
    }
    .instrument(span)
    .await?;

    attachment_response(artifact)
}

fn attachment_response(artifact: ExportArtifact) -> Result<Response, AppError> {
    // from_bytes admits non-ASCII names as obs-text; from_str would reject them.
    let disposition = HeaderValue::from_bytes(
        format!("attachment; filename=\"{}\"", artifact.filename).as_bytes(),
    )
    .map_err(|e| AppError::RenderFailure(format!("invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(artifact.mime_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(artifact.bytes.len())),
        ],
        artifact.bytes,
    )
        .into_response())
}
