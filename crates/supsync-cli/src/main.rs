use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod catalog;
mod feeds;

use catalog::{ImportCommands, SyncScope};
use feeds::FeedsCommands;

#[derive(Debug, Parser)]
#[command(name = "supsync")]
#[command(about = "Supplier catalog import and Shopify sync")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import a supplier feed into the catalog store
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Publish pending SKUs to Shopify
    Sync {
        #[command(flatten)]
        scope: SyncScope,
    },
    /// Push recomputed prices to already published SKUs
    Reprice {
        #[command(flatten)]
        scope: SyncScope,
    },
    /// Compare imported details against imported prices
    Reconcile,
    /// Parse a feed file and print the normalized records as JSON
    Feeds {
        #[command(subcommand)]
        command: FeedsCommands,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Send a `SELECT 1` to the configured database
    Ping,
    /// Apply pending migrations
    Migrate,
}

/// Optional feed path shared by the import and dump commands.
#[derive(Debug, Clone, Args)]
pub(crate) struct FeedPath {
    /// Feed file to read; defaults to the configured path or a scan of the
    /// feed directory
    pub path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = supsync_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = ?config.env, supplier = %config.supplier, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Import { command }) => catalog::run_import(&config, command).await?,
        Some(Commands::Sync { scope }) => catalog::run_sync(&config, scope).await?,
        Some(Commands::Reprice { scope }) => catalog::run_reprice(&config, scope).await?,
        Some(Commands::Reconcile) => catalog::run_reconcile(&config).await?,
        Some(Commands::Feeds { command }) => feeds::run_feeds(&config, command)?,
        Some(Commands::Db { command }) => run_db(&config, command).await?,
        None => println!("supsync ready; see --help for commands"),
    }

    Ok(())
}

async fn run_db(config: &supsync_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = supsync_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            supsync_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = supsync_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
