use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Grounded Spanish question answering over a course document corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask(commands::ask::AskCommand),

    /// Start an interactive chat session
    Chat(commands::chat::ChatCommand),

    /// Load text documents into the passage store
    Ingest(commands::ingest::IngestCommand),

    /// Check endpoint reachability and configuration
    Doctor(commands::doctor::DoctorCommand),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask(cmd) => commands::ask::run(cmd),
        Commands::Chat(cmd) => commands::chat::run(cmd),
        Commands::Ingest(cmd) => commands::ingest::run(cmd),
        Commands::Doctor(cmd) => commands::doctor::run(cmd),
    }
}
