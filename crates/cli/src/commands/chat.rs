//! `partybot chat`: Chat with the party assistant as a guest.

use partybot_agent::{SessionOrchestrator, SessionPhase, TurnReply};
use partybot_channels::CliChannel;
use partybot_core::channel::Channel;
use partybot_core::error::TurnError;
use std::io::Write;
use tracing::debug;

pub async fn run(guest: String, message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    super::require_api_key(&config)?;

    let provider = super::default_provider(&config)?;
    let log = super::open_log(&config).await?;
    let orchestrator = SessionOrchestrator::from_config(&config, provider, log);

    let guest = guest.trim().to_string();
    let phase = orchestrator
        .start_session(&guest)
        .await
        .map_err(|_| "Guest name must not be empty")?;

    let channel = CliChannel::new(&guest);

    let greeting = opening_line(phase, orchestrator.greeting());

    if let Some(msg) = message {
        // Single message mode
        if let Some(greeting) = greeting {
            println!("{greeting}");
        }
        eprint!("  Thinking...");
        let result = orchestrator.handle_turn(&guest, &msg).await;
        eprint!("\r              \r");
        match result {
            Ok(outcome) => println!("{}", outcome.reply),
            Err(TurnError::InvalidInput(_)) => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    println!();
    println!("  🎉 Welcome to the party, {guest}!");
    println!("  Model: {}", orchestrator.model());
    println!("  Type 'exit' or Ctrl+D to leave.");
    println!();

    if let Some(greeting) = greeting {
        channel.send(greeting).await?;
    }

    let mut rx = channel
        .start()
        .await
        .map_err(|e| format!("Channel error: {e}"))?;

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(chan_msg) => {
                eprint!("  ...");
                let turn = orchestrator
                    .handle_turn(&chan_msg.guest, &chan_msg.content)
                    .await;
                eprint!("\r     \r");
                println!();
                render_turn(&channel, turn).await?;

                print!("  You > ");
                std::io::stdout().flush()?;
            }
            Err(e) => {
                eprintln!("  [Channel Error] {e}");
                break;
            }
        }
    }

    println!();
    println!("  See you tonight! 👋");
    println!();

    Ok(())
}

/// The greeting is shown once, before the guest's first message.
fn opening_line(phase: SessionPhase, greeting: &str) -> Option<&str> {
    (phase == SessionPhase::AwaitingFirstMessage).then_some(greeting)
}

/// Show the outcome of one turn. Failures are printed and the chat goes on.
async fn render_turn(
    channel: &CliChannel,
    turn: Result<TurnReply, TurnError>,
) -> Result<(), Box<dyn std::error::Error>> {
    match turn {
        Ok(outcome) => {
            if !outcome.learned.is_empty() {
                debug!(learned = ?outcome.learned, "Topics learned this turn");
            }
            channel.send(&outcome.reply).await?;
        }
        Err(TurnError::InvalidInput(_)) => {}
        Err(TurnError::StorageUnavailable { source, reply }) => {
            if let Some(reply) = reply {
                channel.send(&reply).await?;
            }
            eprintln!("  [Storage Error] {source}");
        }
        Err(e) => eprintln!("  [Error] {e}"),
    }
    Ok(())
}
