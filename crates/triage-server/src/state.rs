use std::sync::Arc;

use triage_core::{Analyzer, ChatOrchestrator};
use triage_store::IncidentStore;

/// Shared application state accessible from all route handlers. Everything is
/// a handle; the orchestrators and store share the provider and connection
/// underneath.
#[derive(Clone)]
pub struct AppState {
    pub store: IncidentStore,
    pub analyzer: Arc<Analyzer>,
    pub chat: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn triage_provider::LlmProvider>,
        store: IncidentStore,
        model: &str,
    ) -> Self {
        Self {
            analyzer: Arc::new(Analyzer::new(Arc::clone(&provider), store.clone(), model)),
            chat: Arc::new(ChatOrchestrator::new(provider, store.clone(), model)),
            store,
        }
    }
}
