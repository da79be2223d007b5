use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default OpenRouter API base URL
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

/// Referer sent upstream when the caller provides none
pub const DEFAULT_REFERER: &str = "https://chatbot-rosy-mu.vercel.app/";

/// Application title sent as `X-Title`
pub const APP_TITLE: &str = "AI Chat App";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const API_KEY_VAR: &str = "CHATLANE_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const BASE_URL_VAR: &str = "CHATLANE_BASE_URL";
pub const MODEL_VAR: &str = "CHATLANE_MODEL";
pub const REFERER_VAR: &str = "CHATLANE_REFERER";
pub const TIMEOUT_VAR: &str = "CHATLANE_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key configured; set {API_KEY_VAR} or {FALLBACK_API_KEY_VAR}")]
    MissingApiKey,
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Settings for the upstream completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub referer: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENROUTER_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get(API_KEY_VAR)
            .or_else(|| get(FALLBACK_API_KEY_VAR))
            .ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(url) = get(BASE_URL_VAR) {
            config.base_url = url;
        }
        if let Some(model) = get(MODEL_VAR) {
            config.model = model;
        }
        if let Some(referer) = get(REFERER_VAR) {
            config.referer = referer;
        }
        if let Some(secs) = get(TIMEOUT_VAR) {
            let parsed = secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: TIMEOUT_VAR,
                    value: secs.clone(),
                })?;
            config.timeout = Duration::from_secs(parsed);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn completions_url(&self) -> String {
        normalize_api_url(&self.base_url)
    }
}

/// Normalize an API URL so it points at the chat completions endpoint
pub fn normalize_api_url(url: &str) -> String {
    if url.contains("/completions") {
        return url.to_string();
    }

    format!("{}/chat/completions", url.trim_end_matches('/'))
}
