//! `partybot config`: Configuration management commands.

use partybot_config::AppConfig;

const REDACTED: &str = "***";

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ Config parsed successfully");

    if let Err(e) = config.validate() {
        println!("   ❌ {e}");
        return Err(e.into());
    }

    if config.has_api_key() || config.default_provider == "ollama" {
        println!("   ✅ All checks passed");
    } else {
        println!();
        println!("   ⚠️  No API key set (set OPENAI_API_KEY or PARTYBOT_API_KEY)");
    }

    println!();
    println!("   Provider:  {}", config.default_provider);
    println!("   Model:     {}", config.default_model);
    println!("   Venue:     {}", config.party.venue);
    println!(
        "   Gateway:   {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("   Storage:   {}", config.storage.backend);

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let toml_str = toml::to_string_pretty(&redacted(&config))?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

/// Copy of the config with every API key masked.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some(REDACTED.into());
    }
    for provider in shown.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some(REDACTED.into());
        }
    }
    shown
}
