//! Sneaker Store CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the store schema and the session table
//! ss-cli migrate
//!
//! # Insert the sample sneakers into an empty catalog
//! ss-cli seed catalog
//!
//! # Delete verified and expired login codes
//! ss-cli codes purge --older-than-minutes 10
//!
//! # Inspect orders
//! ss-cli orders list --email runner@example.com --limit 20
//! ss-cli orders show SNK1234567
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(author, version, about = "Sneaker Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (store schema and sessions)
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Maintain login codes
    Codes {
        #[command(subcommand)]
        action: CodesAction,
    },
    /// Inspect placed orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the sample sneakers if the catalog is empty
    Catalog,
}

#[derive(Subcommand)]
enum CodesAction {
    /// Delete verified codes and codes issued before the cutoff
    Purge {
        /// Codes issued more than this many minutes ago are deleted
        #[arg(long, default_value_t = 10)]
        older_than_minutes: i64,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List the most recent orders
    List {
        /// Only orders placed by this email
        #[arg(short, long)]
        email: Option<String>,

        /// Maximum number of orders to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one order with its line items
    Show {
        /// Order number, e.g. SNK1234567
        number: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog => commands::seed::catalog().await?,
        },
        Commands::Codes { action } => match action {
            CodesAction::Purge { older_than_minutes } => {
                commands::codes::purge(older_than_minutes).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { email, limit } => {
                commands::orders::list(email.as_deref(), limit).await?;
            }
            OrdersAction::Show { number } => commands::orders::show(&number).await?,
        },
    }
    Ok(())
}
