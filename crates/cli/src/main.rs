//! Madreselva CLI - Database migrations and catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! madreselva-cli migrate
//!
//! # Seed the catalog with demo data
//! madreselva-cli seed
//!
//! # Wipe and reseed the catalog
//! madreselva-cli seed --clear
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with a demo catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "madreselva-cli")]
#[command(author, version, about = "Madreselva CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with a demo catalog
    Seed {
        /// Clear existing catalog rows before seeding
        #[arg(long)]
        clear: bool,
    },
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
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { clear } => commands::seed::run(clear).await?,
    }
    Ok(())
}
