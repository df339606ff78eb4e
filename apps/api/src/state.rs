use std::sync::Arc;

use crate::config::Config;
use crate::enhancement::fallback::FallbackTemplates;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable text generator. Production: `GeminiClient`.
    pub generator: Arc<dyn TextGenerator>,
    /// Fallback bullet templates, defaults or the `FALLBACK_TEMPLATES_PATH` override.
    pub templates: Arc<FallbackTemplates>,
    pub config: Config,
}
