pub mod openai;
pub mod openai_compat;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use openai::{OpenAiProvider, ProviderErrorKind};
pub use openai_compat::{custom, ollama_with_base};
pub use types::*;

/// A chat-completion backend. Orchestrators hold this as `Arc<dyn
/// LlmProvider>` so tests can substitute a fake without touching the network.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse>;
}
