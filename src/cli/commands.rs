//! CLI command implementations

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::{error, info, print_server_summary, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config};

/// Write a default artspace.toml in the current directory
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    config::write_default_config(config_path)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Fill in the [database] section, then run 'artspace serve'");

    Ok(())
}

/// Load and validate config, then run the API server
pub async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_valid_config(config_path.as_deref())?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    print_server_summary(&config, &host, port);

    if let Err(e) = crate::api::run_server(config, &host, port).await {
        error(&format!("Server stopped: {}", e));
        return Err(e.into());
    }
    Ok(())
}

/// Print the effective configuration with secrets redacted
pub async fn check_config(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_valid_config(config_path.as_deref())?;

    if config.auth.jwt_secret.is_empty() {
        warn("auth.jwt_secret is empty; a random key will be generated at startup");
    }

    println!("{}", toml::to_string_pretty(&config.redacted())?);
    print_server_summary(&config, &config.server.host, config.server.port);
    success("Configuration is valid");
    Ok(())
}

fn load_valid_config(path: Option<&Path>) -> Result<Config> {
    let config = config::load_config(path).map_err(|e| {
        error(&format!("Failed to load configuration: {}", e));
        e
    })?;

    if let Err(e) = config.validate() {
        error(&format!("Invalid configuration: {}", e));
        return Err(e.into());
    }

    Ok(config)
}
