//! Elegant Closet CLI - migrations, seeding and index checks.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the documents table
//! ec-cli migrate
//!
//! # Load categories, products and settings from YAML
//! ec-cli seed catalog.seed.yaml
//!
//! # Validate a composite index file
//! ec-cli indexes catalog.indexes.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ec-cli")]
#[command(author, version, about = "Elegant Closet CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },
    /// Validate a composite index file
    Indexes {
        /// Path to the index file
        #[arg(default_value = "catalog.indexes.json")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::run(&file).await?;
        }
        Commands::Indexes { file } => {
            commands::indexes::check(&file)?;
        }
    }
    Ok(())
}
