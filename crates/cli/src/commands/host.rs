//! `partybot host`: Host dashboard commands.

use partybot_agent::{HostDashboard, snack_plan};

async fn dashboard() -> Result<HostDashboard, Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let provider = super::default_provider(&config)?;
    let log = super::open_log(&config).await?;
    Ok(HostDashboard::from_config(&config, log, provider))
}

pub async fn signals() -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = dashboard().await?;
    let signals = dashboard.recent_signals().await?;

    println!("🧠 Recent Guest Signals");
    println!();

    if signals.is_empty() {
        println!("  No guest data yet 😄");
        return Ok(());
    }

    for group in signals {
        println!("  {}", group.guest);
        for message in group.messages {
            println!("   • {message}");
        }
        println!();
    }

    Ok(())
}

pub async fn snacks(guests: u32) -> Result<(), Box<dyn std::error::Error>> {
    let plan = snack_plan(guests);

    println!("🍟 Recommended snack buffer for {} guest(s):", guests.max(1));
    println!("   ✅ Chips packets:   {}", plan.chips_packets);
    println!("   ✅ Sweet snacks:    {}", plan.sweet_snacks);
    println!("   ✅ Random munchies: {}", plan.random_munchies);

    Ok(())
}

pub async fn plan() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    super::require_api_key(&config)?;
    let dashboard = dashboard().await?;

    eprint!("  Planning...");
    let plan = dashboard.generate_plan().await;
    eprint!("\r             \r");

    println!("🎛  Party Plan");
    println!();
    println!("{}", plan?);

    Ok(())
}
