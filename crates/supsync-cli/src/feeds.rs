//! Feed dump commands. These parse a feed and print JSON; the database is
//! never touched.

use clap::Subcommand;
use supsync_core::AppConfig;
use supsync_feeds::PriceParseOptions;

use crate::FeedPath;

/// Sub-commands available under `feeds`.
#[derive(Debug, Subcommand)]
pub enum FeedsCommands {
    /// Print the normalized product details
    Details(FeedPath),
    /// Print the normalized price rows
    Price {
        #[command(flatten)]
        feed: FeedPath,
        /// Attach the raw header-to-cell map to each row
        #[arg(long)]
        include_raw: bool,
    },
}

pub(crate) fn run_feeds(config: &AppConfig, command: FeedsCommands) -> anyhow::Result<()> {
    let json = match command {
        FeedsCommands::Details(feed) => {
            let details = supsync_pipeline::load_details_feed(config, feed.path.as_deref())?;
            serde_json::to_string_pretty(&details.records)?
        }
        FeedsCommands::Price { feed, include_raw } => {
            let rows = supsync_pipeline::load_price_feed(
                config,
                feed.path.as_deref(),
                PriceParseOptions { include_raw },
            )?;
            serde_json::to_string_pretty(&rows.records)?
        }
    };
    println!("{json}");
    Ok(())
}
