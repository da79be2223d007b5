use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;

use chatlane_llm_api::{GatewayConfig, OpenRouterClient};

use crate::web::routes;

/// Relay server configuration
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub gateway: GatewayConfig,
}

/// Relay server instance
pub struct WebServer {
    config: WebServerConfig,
}

impl WebServer {
    pub fn new(config: WebServerConfig) -> Self {
        Self { config }
    }

    /// Start the relay and serve until the process exits
    pub async fn start(self) -> Result<()> {
        let client = OpenRouterClient::new(self.config.gateway.clone())
            .context("Failed to build the upstream client")?;
        let app = routes::create_router(routes::AppState::new(client));

        println!(
            "{} http://{}",
            "🌐 Relay listening on".bright_cyan(),
            self.config.bind_addr
        );
        println!(
            "{}",
            format!(
                "   POST /api/chat -> {} ({})",
                self.config.gateway.completions_url(),
                self.config.gateway.model
            )
            .bright_black()
        );

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.config.bind_addr))?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
