mod config;
mod enhancement;
mod errors;
mod export;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::enhancement::fallback::FallbackTemplates;
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MyResume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the text generator
    let generator = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("LLM client initialized (model: {})", generator.model());

    // Fallback bullet templates: built-in defaults unless an override file is configured
    let templates = match &config.fallback_templates_path {
        Some(path) => FallbackTemplates::from_file(path)?,
        None => FallbackTemplates::default(),
    };

    let cors = cors_layer(config.cors_origin.as_deref())?;
    match &config.cors_origin {
        Some(origin) => info!("CORS restricted to {origin}"),
        None => info!("CORS permissive (no CORS_ORIGIN set)"),
    }

    // Build app state
    let state = AppState {
        generator: Arc::new(generator),
        templates: Arc::new(templates),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
