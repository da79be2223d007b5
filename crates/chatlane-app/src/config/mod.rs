use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use chatlane_llm_api::GatewayConfig;

/// Data directory below the home directory
pub const DEFAULT_DATA_DIR: &str = ".chatlane/data";

/// Resolve where the terminal client keeps its sessions
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .context("Cannot determine the home directory; pass --data-dir")?;
    Ok(PathBuf::from(home).join(DEFAULT_DATA_DIR))
}

/// Gateway settings from the environment (after `.env` was loaded)
pub fn load_gateway_config() -> Result<GatewayConfig> {
    let config = GatewayConfig::from_env().context("Failed to read gateway configuration")?;
    log::debug!(
        "Gateway: {} model={} timeout={:?}",
        config.completions_url(),
        config.model,
        config.timeout
    );
    Ok(config)
}
