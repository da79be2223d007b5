//! # chatlane-llm-api
//!
//! Native request gateway for chatlane: an OpenRouter (OpenAI-compatible)
//! chat completions client implementing `CompletionGateway`, plus a raw
//! `forward` used by the relay server.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatlane_llm_api::{GatewayConfig, OpenRouterClient};
//! use chatlane_models::ChatMessage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OpenRouterClient::new(GatewayConfig::from_env()?)?;
//!     let reply = client.complete(vec![ChatMessage::user("Hello!")]).await?;
//!     println!("Response: {}", reply);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;


// Re-export commonly used types
pub use client::OpenRouterClient;

pub use config::{
    ConfigError,
    GatewayConfig,
    normalize_api_url,
    APP_TITLE,
    DEFAULT_MODEL,
    DEFAULT_REFERER,
    OPENROUTER_API_URL,
};
