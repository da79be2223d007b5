use async_trait::async_trait;
use chatlane_chat::{reply_from_response, CompletionGateway, GatewayError};
use chatlane_models::{ChatMessage, ChatRequest};
use gloo_net::http::Request;

/// Relay endpoint served next to the page
pub const DEFAULT_RELAY_URL: &str = "/api/chat";

/// Gateway that posts the context to the relay server, which holds the
/// upstream API key.
pub struct RelayGateway {
    url: String,
    model: Option<String>,
}

impl RelayGateway {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            model: None,
        }
    }

    /// Ask the relay for a specific model instead of its default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, messages: Vec<ChatMessage>) -> serde_json::Value {
        match &self.model {
            Some(model) => serde_json::json!(ChatRequest::new(model.clone(), messages)),
            None => serde_json::json!({ "messages": messages }),
        }
    }
}

#[async_trait(?Send)]
impl CompletionGateway for RelayGateway {
    async fn send(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        let body = self.request_body(messages);

        let response = Request::post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .map_err(|e| GatewayError::Parse(format!("{:?}", e)))?
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("{:?}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("{:?}", e)))?;

        log::debug!("Relay responded with status {}", status);
        reply_from_response(status, &text)
    }
}
