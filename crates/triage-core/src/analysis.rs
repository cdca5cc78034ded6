use std::sync::Arc;

use serde::Deserialize;
use triage_provider::{ChatCompletionRequest, ChatMsg, LlmProvider};
use triage_schema::{coerce_or, AnalyzeResponse, Sentiment, Urgency};
use triage_store::{IncidentStore, NewIncident};

use crate::prompts::analysis_system_prompt;
use crate::CoreError;

const FALLBACK_RESPONSE: &str = "Error processing model response.";
const MISSING_RESPONSE: &str = "Could not generate a suggested response.";

/// Classifies a free-text incident report with the model and persists the
/// result. Holds its collaborators by handle so tests can swap in a mock
/// provider and an in-memory store.
pub struct Analyzer {
    provider: Arc<dyn LlmProvider>,
    store: IncidentStore,
    model: String,
}

/// What the model claims to have produced. Every field is optional: the model
/// is untrusted as a structured-data source, so each field gets an
/// independent safe default downstream.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    suggested_response: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, store: IncidentStore, model: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            model: model.into(),
        }
    }

    /// Analyze one request. Malformed model output never fails the call: a
    /// completely unparseable payload yields the fixed fallback response
    /// (and skips persistence), while individually bad fields are defaulted
    /// and the incident is stored with the resolved values.
    pub async fn analyze(&self, request_text: &str) -> Result<AnalyzeResponse, CoreError> {
        let request = ChatCompletionRequest::new(&self.model)
            .with_message(ChatMsg::system(analysis_system_prompt()))
            .with_message(ChatMsg::user(request_text))
            .with_temperature(0.0)
            .json_object();

        let completion = self
            .provider
            .chat(request)
            .await
            .map_err(CoreError::Provider)?;

        let raw: RawAnalysis = match serde_json::from_str(&completion.text) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    "failed to parse model analysis output: {err}; payload: {}",
                    completion.text
                );
                return Ok(fallback_response());
            }
        };

        let resolved = AnalyzeResponse {
            suggested_response: raw
                .suggested_response
                .unwrap_or_else(|| MISSING_RESPONSE.to_string()),
            sentiment: coerce_or(raw.sentiment.as_deref(), Sentiment::Neutral),
            urgency: coerce_or(raw.urgency.as_deref(), Urgency::Low),
            tags: raw.tags.unwrap_or_else(|| vec!["general".to_string()]),
        };

        self.store
            .create_incident(NewIncident {
                request_text: request_text.to_string(),
                suggested_response: resolved.suggested_response.clone(),
                sentiment: resolved.sentiment,
                urgency: resolved.urgency,
                tags: resolved.tags.clone(),
            })
            .await
            .map_err(CoreError::Store)?;

        Ok(resolved)
    }
}

/// Fixed payload substituted when the model's output cannot be parsed at all.
/// Still a success from the caller's point of view.
fn fallback_response() -> AnalyzeResponse {
    AnalyzeResponse {
        suggested_response: FALLBACK_RESPONSE.to_string(),
        sentiment: Sentiment::Neutral,
        urgency: Urgency::Low,
        tags: vec!["error_parsing".to_string()],
    }
}
