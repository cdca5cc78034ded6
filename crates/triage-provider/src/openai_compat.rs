//! Constructors for endpoints that speak the OpenAI chat-completions wire
//! format behind a different base URL.

use crate::OpenAiProvider;

/// Any OpenAI-compatible endpoint. This is also how the default OpenAI base
/// URL is wired up by the server, so there is a single construction path.
pub fn custom(api_key: impl Into<String>, base_url: impl Into<String>) -> OpenAiProvider {
    OpenAiProvider::new(api_key, base_url)
}

/// Local Ollama runtime. Ollama ignores the bearer token, so a fixed
/// placeholder is sent.
pub fn ollama_with_base(base_url: impl Into<String>) -> OpenAiProvider {
    OpenAiProvider::new("ollama", base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatCompletionRequest, ChatMsg, LlmProvider};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": {"content": text},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn custom_posts_to_the_given_base_with_its_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-local"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("pong")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = custom("sk-local", server.uri());
        let resp = provider
            .chat(ChatCompletionRequest::new("m").with_message(ChatMsg::user("ping")))
            .await
            .unwrap();
        assert_eq!(resp.text, "pong");
    }

    #[tokio::test]
    async fn ollama_sends_the_placeholder_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer ollama"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("local")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = ollama_with_base(server.uri());
        let resp = provider
            .chat(ChatCompletionRequest::new("llama3").with_message(ChatMsg::user("hi")))
            .await
            .unwrap();
        assert_eq!(resp.text, "local");
    }
}
