use anyhow::{Context, Result};
use std::net::SocketAddr;

use crate::config::load_gateway_config;
use crate::web::server::{WebServer, WebServerConfig};

/// Run the relay server
pub async fn run_web_server(bind: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let config = WebServerConfig {
        bind_addr: addr,
        gateway: load_gateway_config()?,
    };

    WebServer::new(config).start().await
}
