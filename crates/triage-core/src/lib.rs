pub mod analysis;
pub mod chat;
mod prompts;

pub use analysis::Analyzer;
pub use chat::{ChatOrchestrator, HISTORY_WINDOW};

/// Failures the HTTP layer has to tell apart. Malformed model output is
/// deliberately absent: it degrades the analysis payload instead of failing
/// the request.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("incident not found: {0}")]
    IncidentNotFound(i64),
    #[error("llm provider failure: {0}")]
    Provider(#[source] anyhow::Error),
    #[error("storage failure: {0}")]
    Store(#[source] anyhow::Error),
}
