//! Storekeep CLI - database migrations and configuration tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! storekeep-cli migrate
//!
//! # Show the effective settings (secrets masked)
//! storekeep-cli config
//!
//! # Read a different env file instead of ./.env
//! storekeep-cli --env-file .env.staging migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storekeep_server::config::{self, Settings};

mod commands;

#[derive(Parser)]
#[command(name = "storekeep-cli")]
#[command(author, version, about = "Storekeep CLI tools")]
struct Cli {
    /// Env file to read instead of `.env` in the working directory
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Show the effective settings
    Config,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match cli.env_file {
        Some(path) => Settings::load_from(&path)?,
        None => config::settings()?.clone(),
    };

    match cli.command {
        Commands::Migrate => commands::migrate::run(&settings).await?,
        Commands::Config => commands::config::show(&settings),
    }
    Ok(())
}
