pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Uri},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::enhancement::handlers as enhancement;
use crate::errors::AppError;
use crate::export::handlers as export;
use crate::state::AppState;

/// Resume payloads carry free-form text; 10 MiB leaves plenty of headroom.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found: {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/resume/generate", post(enhancement::handle_generate))
        .route("/api/export/download", post(export::handle_download))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// A single allowed origin (with credentials) when configured, otherwise permissive.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ORIGIN '{origin}' is not a valid header value"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
