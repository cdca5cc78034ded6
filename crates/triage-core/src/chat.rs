use std::sync::Arc;

use triage_provider::{ChatCompletionRequest, ChatMsg, LlmProvider};
use triage_schema::{ChatMessageView, ChatTurn};
use triage_store::IncidentStore;

use crate::prompts::chat_system_prompt;
use crate::CoreError;

/// How many prior turns of client-supplied history are replayed to the model.
/// Older turns are dropped silently; storage keeps everything.
pub const HISTORY_WINDOW: usize = 5;

const CHAT_TEMPERATURE: f64 = 0.2;

/// Threaded follow-up conversation about one stored incident.
pub struct ChatOrchestrator {
    provider: Arc<dyn LlmProvider>,
    store: IncidentStore,
    model: String,
}

impl ChatOrchestrator {
    pub fn new(provider: Arc<dyn LlmProvider>, store: IncidentStore, model: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            model: model.into(),
        }
    }

    /// One chat turn: look up the incident, replay the last few turns under a
    /// system prompt summarizing it, and persist both sides of the exchange.
    /// The user message is stored before the provider call, so a provider
    /// failure leaves the question on record without an answer.
    pub async fn chat(
        &self,
        incident_id: i64,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, CoreError> {
        let incident = self
            .store
            .get_incident(incident_id)
            .await
            .map_err(CoreError::Store)?
            .ok_or(CoreError::IncidentNotFound(incident_id))?;

        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        let request = ChatCompletionRequest::new(&self.model)
            .with_message(ChatMsg::system(chat_system_prompt(&incident)))
            .with_messages(history[window_start..].iter().map(|turn| ChatMsg {
                role: turn.role.clone(),
                content: turn.content.clone(),
            }))
            .with_message(ChatMsg::user(user_message))
            .with_temperature(CHAT_TEMPERATURE);

        self.store
            .append_chat_message(incident_id, "user", user_message)
            .await
            .map_err(CoreError::Store)?;

        let completion = self
            .provider
            .chat(request)
            .await
            .map_err(CoreError::Provider)?;

        self.store
            .append_chat_message(incident_id, "assistant", &completion.text)
            .await
            .map_err(CoreError::Store)?;

        Ok(completion.text)
    }

    /// Full persisted transcript for an incident, oldest first. Unknown ids
    /// yield an empty list rather than an error.
    pub async fn list_chat(&self, incident_id: i64) -> Result<Vec<ChatMessageView>, CoreError> {
        let messages = self
            .store
            .list_chat_messages(incident_id)
            .await
            .map_err(CoreError::Store)?;
        Ok(messages.into_iter().map(Into::into).collect())
    }
}
