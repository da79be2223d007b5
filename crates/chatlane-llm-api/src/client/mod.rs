use async_trait::async_trait;
use chatlane_chat::{reply_from_response, CompletionGateway, GatewayError};
use chatlane_models::{ChatMessage, ChatRequest};
use serde_json::Value;

use crate::config::{GatewayConfig, APP_TITLE};

/// OpenRouter (OpenAI-compatible) chat completions client
pub struct OpenRouterClient {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send a conversation and return the first choice's content, or an
    /// empty string when the response carries none.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        let request = ChatRequest::new(self.config.model.clone(), messages);
        let body = serde_json::to_value(&request).map_err(|e| GatewayError::Parse(e.to_string()))?;

        log::info!(
            "Requesting completion from {} with {} message(s)",
            self.config.model,
            request.messages.len()
        );

        let (status, text) = self.post(&body, None).await?;
        if !(200..300).contains(&status) {
            log::warn!("Upstream returned {}: {}", status, text);
        }
        reply_from_response(status, &text)
    }

    /// Pass an arbitrary JSON body upstream and hand back the upstream status
    /// and JSON payload unchanged.
    pub async fn forward(&self, body: &Value, referer: Option<&str>) -> Result<(u16, Value), GatewayError> {
        let (status, text) = self.post(body, referer).await?;
        let payload = serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))?;
        Ok((status, payload))
    }

    async fn post(&self, body: &Value, referer: Option<&str>) -> Result<(u16, String), GatewayError> {
        let referer = referer.unwrap_or(&self.config.referer);

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", referer)
            .header("X-Title", APP_TITLE)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(classify)?;
        log::debug!("Upstream responded with status {} ({} bytes)", status, text.len());
        Ok((status, text))
    }
}

fn classify(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_decode() {
        GatewayError::Parse(error.to_string())
    } else {
        GatewayError::Transport(error.to_string())
    }
}

#[async_trait(?Send)]
impl CompletionGateway for OpenRouterClient {
    async fn send(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError> {
        self.complete(messages).await
    }
}
