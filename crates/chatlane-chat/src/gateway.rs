use async_trait::async_trait;
use chatlane_models::{ChatMessage, ChatResponse};
use chatlane_types::ErrorKind;
use thiserror::Error;

/// Failure of a completion request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("malformed response: {0}")]
    Parse(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Timeout => ErrorKind::Timeout,
            GatewayError::Transport(_) => ErrorKind::Transport,
            GatewayError::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            GatewayError::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Request gateway - sends a context to the completion service.
///
/// Implementations carry the model identifier in their configuration. A reply
/// without usable content is returned as an empty string.
#[async_trait(?Send)]
pub trait CompletionGateway {
    async fn send(&self, messages: Vec<ChatMessage>) -> Result<String, GatewayError>;
}

/// Interpret a completion endpoint's HTTP status and body.
///
/// Non-2xx statuses become `UpstreamStatus`; a 2xx body that is not a chat
/// completion becomes `Parse`. A completion without content yields an empty
/// string.
pub fn reply_from_response(status: u16, body: &str) -> Result<String, GatewayError> {
    if !(200..300).contains(&status) {
        return Err(GatewayError::UpstreamStatus {
            status,
            body: body.to_string(),
        });
    }

    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))?;
    Ok(response.reply_text())
}
