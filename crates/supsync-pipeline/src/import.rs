//! Feed import stage: parse a feed and upsert every record into the store.
//!
//! A store failure for one SKU is logged and counted; it never aborts the
//! import.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use supsync_core::{AppConfig, NormalizedSku, PriceRow, ProductDetail};
use supsync_db::CatalogStore;
use supsync_feeds::{FeedKind, ParsedFeed, PriceParseOptions};

use crate::report::write_sample;

const PROGRESS_EVERY: usize = 100;
const MATCHED_SAMPLE: usize = 15;
const MISSING_SAMPLE: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Data rows in the feed, including skipped ones.
    pub read: usize,
    pub upserted: usize,
    /// Rows dropped at parse time for a blank SKU.
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    fn for_feed<T>(feed: &ParsedFeed<T>) -> Self {
        Self {
            read: feed.data_rows,
            skipped: feed.skipped,
            ..Self::default()
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows read:      {}", self.read)?;
        writeln!(f, "Rows upserted:  {}", self.upserted)?;
        writeln!(f, "Rows skipped:   {}", self.skipped)?;
        writeln!(f, "Rows failed:    {}", self.failed)
    }
}

/// Price import result plus its join against the stored details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceImportReport {
    pub summary: ImportSummary,
    /// Upserted SKUs that have a detail row, first-seen order, no duplicates.
    pub matched: Vec<NormalizedSku>,
    /// Upserted SKUs with no detail row, first-seen order, no duplicates.
    pub missing_details: Vec<NormalizedSku>,
}

impl fmt::Display for PriceImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Price import summary ---")?;
        write!(f, "{}", self.summary)?;
        writeln!(f, "SKUs matched to details: {}", self.matched.len())?;
        writeln!(f, "SKUs missing details:    {}", self.missing_details.len())?;
        write_sample(f, "Example matched SKUs", &self.matched, MATCHED_SAMPLE)?;
        write_sample(f, "Missing details", &self.missing_details, MISSING_SAMPLE)
    }
}

/// Upserts parsed detail records.
pub async fn import_details(
    store: &dyn CatalogStore,
    feed: &ParsedFeed<ProductDetail>,
) -> ImportSummary {
    let mut summary = ImportSummary::for_feed(feed);

    for detail in &feed.records {
        match store.upsert_detail(detail).await {
            Ok(()) => {
                summary.upserted += 1;
                if summary.upserted % PROGRESS_EVERY == 0 {
                    tracing::info!(upserted = summary.upserted, "detail import progress");
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(sku = %detail.sku, error = %e, "failed to upsert detail");
            }
        }
    }

    tracing::info!(
        read = summary.read,
        upserted = summary.upserted,
        skipped = summary.skipped,
        failed = summary.failed,
        "detail import finished"
    );
    summary
}

/// Upserts parsed price rows with `currency` and reports which of them have
/// a matching detail row for `supplier`.
///
/// # Errors
///
/// Returns an error only if the detail SKUs cannot be listed for the match
/// report; per-row upsert failures are counted, not propagated.
pub async fn import_prices(
    store: &dyn CatalogStore,
    supplier: &str,
    feed: &ParsedFeed<PriceRow>,
    currency: &str,
) -> anyhow::Result<PriceImportReport> {
    let detail_skus: HashSet<NormalizedSku> = store
        .list_detail_skus(supplier)
        .await
        .context("failed to list detail SKUs for the price match report")?
        .into_iter()
        .collect();

    let mut report = PriceImportReport {
        summary: ImportSummary::for_feed(feed),
        ..PriceImportReport::default()
    };
    let mut seen: HashSet<&NormalizedSku> = HashSet::new();

    for row in &feed.records {
        if let Err(e) = store.upsert_price(row, currency).await {
            report.summary.failed += 1;
            tracing::error!(sku = %row.sku, error = %e, "failed to upsert price row");
            continue;
        }
        report.summary.upserted += 1;
        if report.summary.upserted % PROGRESS_EVERY == 0 {
            tracing::info!(upserted = report.summary.upserted, "price import progress");
        }

        if !seen.insert(&row.sku) {
            continue;
        }
        if detail_skus.contains(&row.sku) {
            report.matched.push(row.sku.clone());
        } else {
            report.missing_details.push(row.sku.clone());
        }
    }

    tracing::info!(
        read = report.summary.read,
        upserted = report.summary.upserted,
        skipped = report.summary.skipped,
        failed = report.summary.failed,
        matched = report.matched.len(),
        missing_details = report.missing_details.len(),
        "price import finished"
    );
    Ok(report)
}

fn resolve(config: &AppConfig, feed: FeedKind, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    let configured = match feed {
        FeedKind::Details => config.details_csv_path.as_deref(),
        FeedKind::Price => config.price_csv_path.as_deref(),
    };
    let path = supsync_feeds::resolve_feed_path(feed, explicit, configured, &config.feed_dir)?;
    tracing::info!(%feed, path = %path.display(), "using feed file");
    Ok(path)
}

/// Locates and parses the details feed for the configured supplier.
///
/// # Errors
///
/// Returns an error if the feed file cannot be resolved or parsed.
pub fn load_details_feed(
    config: &AppConfig,
    explicit: Option<&Path>,
) -> anyhow::Result<ParsedFeed<ProductDetail>> {
    let path = resolve(config, FeedKind::Details, explicit)?;
    supsync_feeds::parse_details_file(&path, &config.supplier)
        .with_context(|| format!("failed to parse details feed {}", path.display()))
}

/// Locates and parses the price feed for the configured supplier.
///
/// # Errors
///
/// Returns an error if the feed file cannot be resolved or parsed.
pub fn load_price_feed(
    config: &AppConfig,
    explicit: Option<&Path>,
    options: PriceParseOptions,
) -> anyhow::Result<ParsedFeed<PriceRow>> {
    let path = resolve(config, FeedKind::Price, explicit)?;
    supsync_feeds::parse_price_file(&path, &config.supplier, options)
        .with_context(|| format!("failed to parse price feed {}", path.display()))
}

/// Resolves, parses and imports the details feed.
///
/// # Errors
///
/// Returns an error if the feed cannot be resolved or parsed. Nothing is
/// written in that case.
pub async fn import_details_feed(
    store: &dyn CatalogStore,
    config: &AppConfig,
    explicit: Option<&Path>,
) -> anyhow::Result<ImportSummary> {
    let feed = load_details_feed(config, explicit)?;
    Ok(import_details(store, &feed).await)
}

/// Resolves, parses and imports the price feed.
///
/// # Errors
///
/// Returns an error if the feed cannot be resolved or parsed, or if the
/// match report cannot be built.
pub async fn import_price_feed(
    store: &dyn CatalogStore,
    config: &AppConfig,
    explicit: Option<&Path>,
) -> anyhow::Result<PriceImportReport> {
    let feed = load_price_feed(config, explicit, PriceParseOptions::default())?;
    import_prices(store, &config.supplier, &feed, &config.currency).await
}
