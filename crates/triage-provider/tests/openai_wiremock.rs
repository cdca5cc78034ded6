use triage_provider::{ChatCompletionRequest, ChatMsg, LlmProvider, OpenAiProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_openai_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": {"content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    })
}

fn mock_openai_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": {
            "type": "api_error",
            "message": message
        }
    }))
}

#[tokio::test]
async fn basic_chat_with_header_verification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_openai_response("Hello there!")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let resp = provider
        .chat(
            ChatCompletionRequest::new("gpt-4o-mini")
                .with_message(ChatMsg::system("be helpful"))
                .with_message(ChatMsg::user("hi")),
        )
        .await
        .unwrap();

    assert_eq!(resp.text, "Hello there!");
    assert_eq!(resp.input_tokens, Some(10));
    assert_eq!(resp.output_tokens, Some(5));
}

#[tokio::test]
async fn json_mode_sends_response_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "response_format": {"type": "json_object"},
            "temperature": 0.0
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_openai_response(r#"{"ok": true}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let resp = provider
        .chat(
            ChatCompletionRequest::new("gpt-4o-mini")
                .with_message(ChatMsg::user("classify this"))
                .json_object(),
        )
        .await
        .unwrap();

    assert_eq!(resp.text, r#"{"ok": true}"#);
}

#[tokio::test]
async fn auth_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(mock_openai_error(401, "bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("wrong-key", server.uri());
    let err = provider
        .chat(ChatCompletionRequest::new("m").with_message(ChatMsg::user("hi")))
        .await
        .err()
        .unwrap();

    assert!(err.to_string().contains("bad key"));
}

#[tokio::test]
async fn server_error_gets_one_retry() {
    let server = MockServer::start().await;

    // First attempt fails with a 500, the single retry succeeds.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(mock_openai_error(500, "transient"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_openai_response("recovered")),
        )
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let resp = provider
        .chat(ChatCompletionRequest::new("m").with_message(ChatMsg::user("hi")))
        .await
        .unwrap();

    assert_eq!(resp.text, "recovered");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn persistent_server_error_fails_after_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(mock_openai_error(503, "down for maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("test-key", server.uri());
    let err = provider
        .chat(ChatCompletionRequest::new("m").with_message(ChatMsg::user("hi")))
        .await
        .err()
        .unwrap();

    assert!(err.to_string().contains("down for maintenance"));
}
