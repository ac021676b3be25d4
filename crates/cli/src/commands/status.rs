//! `partybot status`: Show configuration and conversation log status.

use partybot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    println!("🎉 partybot Status");
    println!("==================\n");
    println!(
        "  Config:    {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!(
        "  API key:   {}",
        if config.has_api_key() { "set" } else { "missing" }
    );
    println!("  Venue:     {}", config.party.venue);
    println!(
        "  Gateway:   {}:{}",
        config.gateway.host, config.gateway.port
    );

    match config.storage.backend.as_str() {
        "sqlite" => println!(
            "  Storage:   sqlite ({})",
            config.storage.resolved_path().display()
        ),
        other => println!("  Storage:   {other}"),
    }

    match super::open_log(&config).await {
        Ok(log) => match log.count().await {
            Ok(count) => println!("  Records:   {count}"),
            Err(e) => println!("  Records:   unavailable ({e})"),
        },
        Err(e) => println!("  Records:   unavailable ({e})"),
    }

    println!();
    Ok(())
}
