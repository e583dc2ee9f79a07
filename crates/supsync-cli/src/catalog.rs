//! Store-backed command handlers: import, sync, reprice and reconcile.
//!
//! Each handler connects its own pool from config. `sync` and `reprice`
//! build the Shopify client first so missing credentials fail before any
//! SKU is touched.

use clap::{Args, Subcommand};
use supsync_core::AppConfig;
use supsync_db::PgCatalogStore;
use supsync_pipeline::{BatchSize, SyncOptions};
use supsync_shopify::ShopifyAdminClient;

use crate::FeedPath;

/// Sub-commands available under `import`.
#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Import the product details feed
    Details(FeedPath),
    /// Import the price and stock feed
    Price(FeedPath),
}

/// Batch selection for `sync` and `reprice`.
#[derive(Debug, Clone, Copy, Args)]
pub(crate) struct SyncScope {
    /// Maximum number of SKUs to process (defaults to SUPSYNC_SYNC_BATCH_LIMIT)
    #[arg(long, conflicts_with = "all", value_parser = clap::value_parser!(i64).range(1..))]
    pub limit: Option<i64>,
    /// Process every SKU, up to 10000
    #[arg(long)]
    pub all: bool,
}

impl SyncScope {
    /// `None` leaves the configured batch limit in place.
    pub(crate) fn batch_size(self) -> Option<BatchSize> {
        if self.all {
            Some(BatchSize::All)
        } else {
            self.limit.map(BatchSize::Limit)
        }
    }
}

async fn connect_store(config: &AppConfig) -> anyhow::Result<PgCatalogStore> {
    let pool = supsync_db::connect_pool_from_config(config).await?;
    Ok(PgCatalogStore::new(pool))
}

/// Runs a feed import and prints its summary followed by the reconciliation
/// report.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the feed cannot be
/// resolved or parsed. Per-SKU upsert failures are counted, not propagated.
pub(crate) async fn run_import(config: &AppConfig, command: ImportCommands) -> anyhow::Result<()> {
    let store = connect_store(config).await?;

    match command {
        ImportCommands::Details(feed) => {
            let summary =
                supsync_pipeline::import_details_feed(&store, config, feed.path.as_deref())
                    .await?;
            print!("--- Details import ---\n{summary}");
        }
        ImportCommands::Price(feed) => {
            let report =
                supsync_pipeline::import_price_feed(&store, config, feed.path.as_deref()).await?;
            print!("{report}");
        }
    }

    let reconciliation = supsync_pipeline::reconcile(&store, &config.supplier).await?;
    print!("\n{reconciliation}");
    Ok(())
}

/// Publishes one batch of pending SKUs.
///
/// # Errors
///
/// Returns an error if Shopify credentials are missing, the database is
/// unreachable, or the batch cannot be selected.
pub(crate) async fn run_sync(config: &AppConfig, scope: SyncScope) -> anyhow::Result<()> {
    let api = ShopifyAdminClient::from_config(config)?;
    let store = connect_store(config).await?;
    let options = SyncOptions::from_config(config, scope.batch_size());

    let report = supsync_pipeline::sync_catalog(&store, &api, &options).await?;
    print!("{report}");
    Ok(())
}

/// Refreshes prices of already published SKUs.
///
/// # Errors
///
/// Returns an error if Shopify credentials are missing, the database is
/// unreachable, or the synced SKUs cannot be listed.
pub(crate) async fn run_reprice(config: &AppConfig, scope: SyncScope) -> anyhow::Result<()> {
    let api = ShopifyAdminClient::from_config(config)?;
    let store = connect_store(config).await?;
    let options = SyncOptions::from_config(config, scope.batch_size());

    let report = supsync_pipeline::reprice_catalog(&store, &api, &options).await?;
    print!("{report}");
    Ok(())
}

/// Prints the details/price match report for the configured supplier.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a listing fails.
pub(crate) async fn run_reconcile(config: &AppConfig) -> anyhow::Result<()> {
    let store = connect_store(config).await?;
    let report = supsync_pipeline::reconcile(&store, &config.supplier).await?;
    print!("{report}");
    Ok(())
}
