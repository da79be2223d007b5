#![allow(dead_code)]

use std::time::Duration;

use chatlane_llm_api::{GatewayConfig, OpenRouterClient};
use serde_json::{json, Value};
use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "test/model";

/// Mock completion service
pub struct CompletionMockServer {
    server: MockServer,
}

impl CompletionMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client pointed at this server
    pub fn client(&self) -> OpenRouterClient {
        self.client_with_timeout(Duration::from_secs(5))
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> OpenRouterClient {
        let config = GatewayConfig::new(TEST_API_KEY)
            .with_base_url(format!("{}/api/v1", self.uri()))
            .with_model(TEST_MODEL)
            .with_timeout(timeout);
        OpenRouterClient::new(config).expect("build client")
    }

    /// Successful completion carrying `content`
    pub async fn mock_success(&self, content: &str) {
        self.mock_json(200, completion_body(json!(content))).await;
    }

    pub async fn mock_json(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Success that only answers after `delay`
    pub async fn mock_slow(&self, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(json!("late")))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Expect exactly one request matching the headers and body prefix the
    /// client is supposed to send
    pub async fn expect_request(&self, referer: &str, body: Value, reply: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
            .and(header("http-referer", referer))
            .and(header("x-title", "AI Chat App"))
            .and(body_partial_json(body))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!(reply))))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

pub fn completion_body(content: Value) -> Value {
    json!({
        "id": "gen-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": TEST_MODEL,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}
