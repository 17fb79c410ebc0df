use std::sync::Arc;

use crate::config::Config;
use crate::ingest::PageRenderer;
use crate::model_client::EvaluationModel;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Both collaborators sit behind traits so tests can substitute fakes —
/// in particular, asserting that no model call is made when no resume
/// was uploaded.
#[derive(Clone)]
pub struct AppState {
    /// PDF first-page rasterizer. Default: `PdfiumRenderer`.
    pub renderer: Arc<dyn PageRenderer>,
    /// Generative model client. Default: `GeminiClient`.
    pub model: Arc<dyn EvaluationModel>,
    /// Kept request-scoped rather than as a module-level global.
    /// Only `main` reads it today.
    #[allow(dead_code)]
    pub config: Config,
}
