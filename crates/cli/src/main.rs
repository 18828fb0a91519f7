//! Marigold CLI - Database migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (storefront and admin share one database)
//! mg-cli migrate
//!
//! # Grant admin access to an existing account
//! mg-cli admin grant -e priya@example.com
//!
//! # Revoke admin access
//! mg-cli admin revoke -e priya@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin grant` / `admin revoke` - Flip the `is_admin` flag on an account
//!
//! Admins are ordinary accounts with a flag, so there is no "create admin"
//! command: the person signs up through the storefront first, then gets
//! the flag granted here.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mg-cli")]
#[command(author, version, about = "Marigold CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant admin access to an existing account
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke admin access from an account
    Revoke {
        /// Account email address
        #[arg(short, long)]
        email: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => {
                commands::admin::set_admin(&email, true).await?;
            }
            AdminAction::Revoke { email } => {
                commands::admin::set_admin(&email, false).await?;
            }
        },
    }
    Ok(())
}
