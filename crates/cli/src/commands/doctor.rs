//! `partybot doctor`: Diagnose system health.

use partybot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 partybot Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, using defaults (run `partybot onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!();
            println!("  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    match config.validate() {
        Ok(()) => println!("  ✅ Config valid"),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if config.has_api_key() || config.default_provider == "ollama" {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key configured (set OPENAI_API_KEY or add api_key to config.toml)");
        issues += 1;
    }

    match partybot_store::open_from_config(&config.storage).await {
        Ok(log) => match log.count().await {
            Ok(count) => println!(
                "  ✅ Conversation log reachable ({}, {count} records)",
                config.storage.backend
            ),
            Err(e) => {
                println!("  ❌ Conversation log query failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Conversation log unavailable: {e}");
            issues += 1;
        }
    }

    match super::default_provider(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ⚠️  Provider '{}' responded but is not healthy", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
