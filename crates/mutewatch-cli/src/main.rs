//! mutewatch CLI - notices when you talk into a muted microphone.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mutewatch")]
#[command(author, version, about = "Talking-while-muted detector", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor a microphone and notify when speech is detected while muted
    Watch(commands::watch::WatchArgs),

    /// Run a WAV file through the detector and print every notification
    Simulate(commands::simulate::SimulateArgs),

    /// List and inspect audio devices
    Devices(commands::devices::DevicesArgs),

    /// Show and edit the settings file
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Devices(args) => commands::devices::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
