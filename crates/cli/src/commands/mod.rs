//! Subcommand implementations.

pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod gateway;
pub mod host;
pub mod onboard;
pub mod status;

use partybot_config::AppConfig;
use partybot_core::log::ConversationLog;
use partybot_core::provider::Provider;
use std::sync::Arc;

/// Load the config, turning failures into a readable message.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Fail early with setup instructions when no API key is available.
pub fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() || config.default_provider == "ollama" {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export OPENAI_API_KEY='sk-...'      (for OpenAI)");
    eprintln!("    export PARTYBOT_API_KEY='sk-...'    (generic, takes priority)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}

/// The default completion provider, with retries applied.
pub fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let router = partybot_providers::router::build_from_config(config);
    Ok(router.default().ok_or("No default provider configured")?)
}

pub async fn open_log(
    config: &AppConfig,
) -> Result<Arc<dyn ConversationLog>, Box<dyn std::error::Error>> {
    let log = partybot_store::open_from_config(&config.storage)
        .await
        .map_err(|e| format!("Failed to open conversation log: {e}"))?;
    Ok(log)
}
