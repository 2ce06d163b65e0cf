//! McD Calories CLI - database setup and menu management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the items table
//! mc-cli init-db
//!
//! # Check a menu file without writing anything
//! mc-cli seed crates/cli/seed/menu.yaml --dry-run
//!
//! # Insert or update menu items from a YAML file
//! mc-cli seed crates/cli/seed/menu.yaml
//!
//! # Show item counts per category
//! mc-cli stats
//! ```
//!
//! The database comes from `MENU_DATABASE_URL` (or `DATABASE_URL`), the same
//! variable the web server reads.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mc-cli")]
#[command(author, version, about = "McD Calories CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the items table if it does not exist
    InitDb,
    /// Insert or update menu items from a YAML file
    Seed {
        /// Path to the YAML menu file
        file: PathBuf,

        /// Validate the file without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show item counts per category
    Stats,
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

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::InitDb => commands::init_db::run().await,
        Commands::Seed { file, dry_run } => commands::seed::run(&file, dry_run).await,
        Commands::Stats => commands::stats::run().await,
    }
}
