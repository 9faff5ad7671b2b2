//! Mock backend inference engine
//!
//! Wiremock stand-in for the OpenAI-compatible backend behind the gateway:
//! - POST /v1/chat/completions - non-streaming, SSE, and error responses
//!
//! ```rust,ignore
//! let inference = MockInference::start().await;
//! inference.mock_chat_completion_success("Hello!").await;
//! // Use inference.base_url() as INFERENCE_URL
//! ```

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Mock inference backend wrapper
pub struct MockInference {
    server: MockServer,
}

impl MockInference {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL the gateway should be configured with, including `/v1`
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Mock a non-streaming completion that only answers when the gateway's
    /// own backend key is presented
    pub async fn mock_chat_completion_success(&self, content: &str, upstream_key: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .and(header("Authorization", format!("Bearer {}", upstream_key).as_str()))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(InferenceTestData::completion(content)))
            .mount(&self.server)
            .await;
    }

    /// Mock an SSE response with a fixed body
    pub async fn mock_chat_completion_stream(&self, sse_body: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(sse_body.as_bytes().to_vec(), "text/event-stream")
                    .insert_header("Cache-Control", "no-cache"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an error status with an OpenAI-style error body
    pub async fn mock_chat_completion_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "message": message,
                    "type": "server_error"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Bodies the backend received, parsed as JSON
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Last request the backend received
    pub async fn last_request(&self) -> Option<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .and_then(|mut requests| requests.pop())
    }
}

/// Canned backend payloads
pub struct InferenceTestData;

impl InferenceTestData {
    pub fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-test-123",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "local-model",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })
    }

    /// A short SSE stream in the backend's own framing
    pub fn sse_stream(words: &[&str]) -> String {
        let mut body = String::new();
        for word in words {
            let chunk = json!({
                "id": "chatcmpl-test-123",
                "object": "chat.completion.chunk",
                "created": 1700000000,
                "model": "local-model",
                "choices": [{"index": 0, "delta": {"content": word}, "finish_reason": null}]
            });
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }
}
