use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{ChatCompletionRequest, ChatCompletionResponse, ChatMsg, LlmProvider};

/// OpenAI-compatible chat-completions client. Also covers any backend that
/// speaks the same wire format behind a different base URL.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    RateLimit,
    ServerError,
    Timeout,
    Connect,
    AuthError,
    InvalidRequest,
    Unknown,
}

impl ProviderErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            429 => Self::RateLimit,
            401 | 403 => Self::AuthError,
            400 | 422 => Self::InvalidRequest,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::ServerError | Self::Timeout | Self::Connect
        )
    }
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn send_once(
        &self,
        payload: &ApiRequest,
    ) -> std::result::Result<ChatCompletionResponse, (ProviderErrorKind, anyhow::Error)> {
        let url = format!("{}/chat/completions", self.api_base);
        let resp = match self
            .client
            .post(url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                return Err((
                    ProviderErrorKind::Timeout,
                    anyhow!("openai api error (timeout): request timed out after 60s"),
                ));
            }
            Err(e) if e.is_connect() => {
                return Err((
                    ProviderErrorKind::Connect,
                    anyhow!("openai api error (connect): {e}"),
                ));
            }
            Err(e) => return Err((ProviderErrorKind::Unknown, e.into())),
        };

        let status = resp.status();
        if status != StatusCode::OK {
            let kind = ProviderErrorKind::from_status(status);
            let text = resp.text().await.unwrap_or_default();
            let parsed = serde_json::from_str::<ApiErrorEnvelope>(&text).ok();
            return Err((kind, format_api_error(status, parsed)));
        }

        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| (ProviderErrorKind::Unknown, e.into()))?;
        to_completion_response(body).map_err(|e| (ProviderErrorKind::Unknown, e))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let payload = to_api_request(request);

        // One bounded retry on transient upstream failures, nothing fancier.
        match self.send_once(&payload).await {
            Ok(resp) => Ok(resp),
            Err((kind, err)) if kind.is_retryable() => {
                tracing::warn!("retrying chat completion after {kind:?}: {err}");
                self.send_once(&payload).await.map_err(|(_, e)| e)
            }
            Err((_, err)) => Err(err),
        }
    }
}

fn format_api_error(status: StatusCode, parsed: Option<ApiErrorEnvelope>) -> anyhow::Error {
    if let Some(api_error) = parsed {
        anyhow!(
            "openai api error ({status}): {} ({})",
            api_error.error.message,
            api_error.error.r#type
        )
    } else {
        anyhow!("openai api error ({status})")
    }
}

fn to_api_request(request: ChatCompletionRequest) -> ApiRequest {
    ApiRequest {
        model: request.model,
        messages: request.messages,
        temperature: request.temperature,
        max_tokens: Some(request.max_tokens),
        response_format: if request.json_mode {
            Some(ApiResponseFormat {
                format_type: "json_object".to_string(),
            })
        } else {
            None
        },
    }
}

fn to_completion_response(body: ApiResponse) -> Result<ChatCompletionResponse> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("openai api error: empty choices"))?;
    let text = choice.message.content.unwrap_or_default();
    let (input_tokens, output_tokens) = match body.usage {
        Some(usage) => (Some(usage.prompt_tokens), Some(usage.completion_tokens)),
        None => (None, None),
    };
    Ok(ChatCompletionResponse {
        text,
        input_tokens,
        output_tokens,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiRequest {
    pub model: String,
    pub messages: Vec<ChatMsg>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ApiResponseFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiResponse {
    pub choices: Vec<ApiChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiChoice {
    pub message: ApiAssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiAssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(rename = "type")]
    pub r#type: String,
    pub message: String,
}
