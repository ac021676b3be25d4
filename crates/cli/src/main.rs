//! partybot CLI: the main entry point.
//!
//! Commands:
//! - `onboard`   Create the config file
//! - `chat`      Chat as a guest (interactive or single message)
//! - `host`      Host dashboard: guest signals, snack buffer, party plan
//! - `gateway`   Start the HTTP API server
//! - `status`    Show configuration and conversation log status
//! - `doctor`    Diagnose setup problems
//! - `config`    Show, validate, or locate the config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "partybot",
    about = "partybot — a party assistant that remembers what guests already told it",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file
    Onboard,

    /// Chat with the party assistant as a guest
    Chat {
        /// Your name, as the host knows you
        #[arg(short, long)]
        guest: String,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Host dashboard
    Host {
        #[command(subcommand)]
        command: HostCommands,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show system status
    Status,

    /// Diagnose system health
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum HostCommands {
    /// Recent messages from each guest
    Signals,

    /// Recommended snack buffer
    Snacks {
        /// Expected number of guests
        #[arg(short, long, default_value_t = 3)]
        guests: u32,
    },

    /// Generate a party strategy from everything guests said
    Plan,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration (API keys redacted)
    Show,

    /// Validate the configuration file
    Validate,

    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { guest, message } => commands::chat::run(guest, message).await?,
        Commands::Host { command } => match command {
            HostCommands::Signals => commands::host::signals().await?,
            HostCommands::Snacks { guests } => commands::host::snacks(guests).await?,
            HostCommands::Plan => commands::host::plan().await?,
        },
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config_cmd::show().await?,
            ConfigCommands::Validate => commands::config_cmd::validate().await?,
            ConfigCommands::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
