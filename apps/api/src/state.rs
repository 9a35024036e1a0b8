use std::sync::Arc;

use crate::llm_client::CompletionModel;
use crate::persistence::Persistence;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. Production: `LlmClient`.
    pub llm: Arc<dyn CompletionModel>,
    /// Datastore handle plus its reachability; writes through it are best-effort.
    pub persistence: Persistence,
}
