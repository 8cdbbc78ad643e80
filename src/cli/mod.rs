use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;

use crate::core::config::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session
    Chat {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Configuration errors are fatal and must surface before the loop
    // starts
    let config = AppConfig::from_env()?;

    // Handle each sub command. A bare invocation starts chat too since
    // the interactive session is the whole program.
    match args.command {
        Some(Command::Chat {}) | None => {
            chat::run(&config).await?;
        }
    }

    Ok(())
}
