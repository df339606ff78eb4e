use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("AI service misconfigured: {0}")]
    UpstreamConfig(String),

    #[error("AI service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Model reply contained no JSON object")]
    NoStructuredContent,

    #[error("Model reply JSON could not be parsed: {0}")]
    MalformedStructuredContent(String),

    #[error("Model reply has the wrong shape: {0}")]
    InvalidDocumentShape(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Render failure: {0}")]
    RenderFailure(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status, machine-readable code, and the message shown to callers.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        const AI_PROCESSING_FAILED: &str = "AI processing failed, please try again";

        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UpstreamConfig(msg) => {
                tracing::error!("AI service misconfigured: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_CONFIG_ERROR",
                    "AI service is not configured".to_string(),
                )
            }
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("AI service unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "AI service is unavailable, please try again".to_string(),
                )
            }
            AppError::NoStructuredContent => {
                tracing::error!("Model reply contained no JSON object");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NO_STRUCTURED_CONTENT",
                    AI_PROCESSING_FAILED.to_string(),
                )
            }
            AppError::MalformedStructuredContent(msg) => {
                tracing::error!("Model reply JSON could not be parsed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_STRUCTURED_CONTENT",
                    AI_PROCESSING_FAILED.to_string(),
                )
            }
            AppError::InvalidDocumentShape(msg) => {
                tracing::error!("Model reply has the wrong shape: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVALID_DOCUMENT_SHAPE",
                    AI_PROCESSING_FAILED.to_string(),
                )
            }
            AppError::UnsupportedFormat(_) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                "Unsupported format. Use pdf, docx, or json".to_string(),
            ),
            AppError::RenderFailure(msg) => {
                tracing::error!("Render failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_FAILURE",
                    "Failed to export resume".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "success": false,
            "code": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_message_is_passed_through() {
        let (status, body) = render(AppError::Validation("Form data is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Form data is required");
    }

    #[tokio::test]
    async fn test_ai_failures_share_a_generic_message() {
        for err in [
            AppError::NoStructuredContent,
            AppError::MalformedStructuredContent("expected `,` at line 3".into()),
            AppError::InvalidDocumentShape("got array".into()),
        ] {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["message"], "AI processing failed, please try again");
        }
    }

    #[tokio::test]
    async fn test_upstream_detail_is_not_leaked() {
        let (status, body) =
            render(AppError::UpstreamUnavailable("API key sk-123 rejected".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["message"].as_str().unwrap().contains("sk-123"));
    }

    #[tokio::test]
    async fn test_unsupported_format_lists_supported_ones() {
        let (status, body) = render(AppError::UnsupportedFormat("txt".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Unsupported format. Use pdf, docx, or json");
    }
}
