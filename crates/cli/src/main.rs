//! Neo Bazaar CLI - catalog seeding and order management.
//!
//! # Usage
//!
//! ```bash
//! # Check a seed file without touching the backend
//! nb-cli seed products catalog.yaml --dry-run
//!
//! # Insert products missing from the catalog
//! nb-cli seed products catalog.yaml
//!
//! # Dashboard figures
//! nb-cli orders stats
//!
//! # Move an order along its lifecycle
//! nb-cli orders status 2f1c...-uuid shipped
//! ```
//!
//! Reads `BACKEND_URL`, `BACKEND_ANON_KEY` and `BACKEND_SERVICE_KEY` from the
//! environment or `.env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use neobazaar_core::{OrderId, OrderStatus};

mod commands;

#[derive(Parser)]
#[command(name = "nb-cli")]
#[command(author, version, about = "Neo Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the backend with data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect and update orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the seed file
        file: String,

        /// Validate only, write nothing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Print order counts and paid revenue
    Stats,
    /// Change an order's status
    Status {
        /// Order ID
        id: OrderId,

        /// New status (pending, processing, shipped, delivered, cancelled)
        status: OrderStatus,
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
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, dry_run } => {
                commands::seed::products(&file, dry_run).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrdersAction::Stats => commands::orders::stats().await?,
            OrdersAction::Status { id, status } => {
                commands::orders::set_status(id, status).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_status_argument_parsed() {
        let id = OrderId::generate();
        let cli = Cli::try_parse_from(["nb-cli", "orders", "status", &id.to_string(), "Shipped"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Orders {
                action: OrdersAction::Status { status: OrderStatus::Shipped, .. }
            })
        ));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let id = OrderId::generate().to_string();
        assert!(Cli::try_parse_from(["nb-cli", "orders", "status", &id, "lost"]).is_err());
    }
}
