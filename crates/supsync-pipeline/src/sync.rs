//! Catalog sync driver: publishes pending SKUs to the storefront.
//!
//! Each SKU ends in one of four states. It is SYNCED when the storefront ids
//! were recorded, either for a newly created product or for an orphan from an
//! interrupted run found by handle. It is SKIPPED when there is no positive
//! sell price, and FAILED on any external or store error.
//!
//! SKUs are processed strictly one after another with a fixed delay between
//! storefront calls. Ids are recorded only after both the create and the
//! variant update succeed, so an interrupted run leaves the SKU pending and
//! the next run finds the product by handle instead of creating it again.

use std::fmt;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use supsync_core::{
    compute_sell_price, AppConfig, ExternalIds, PriceRow, PricingRules, ProductDetail,
    StoredDetail,
};
use supsync_db::CatalogStore;
use supsync_shopify::{CatalogApi, VariantUpdate};

use crate::payload::build_new_product;
use crate::report::{write_sample, SkuIssue};

/// Upper bound for `--all`.
pub const ALL_CAP: i64 = 10_000;

const PROGRESS_EVERY: usize = 10;
const ISSUE_SAMPLE: usize = 20;

/// How many pending SKUs one run may process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSize {
    Limit(i64),
    All,
}

impl BatchSize {
    #[must_use]
    pub fn as_limit(self) -> i64 {
        match self {
            BatchSize::Limit(n) => n.clamp(1, ALL_CAP),
            BatchSize::All => ALL_CAP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub supplier: String,
    pub batch: BatchSize,
    /// Pause between consecutive storefront write sequences.
    pub inter_call_delay: Duration,
    pub pricing: PricingRules,
}

impl SyncOptions {
    /// Options from config; `batch` overrides the configured batch limit.
    #[must_use]
    pub fn from_config(config: &AppConfig, batch: Option<BatchSize>) -> Self {
        Self {
            supplier: config.supplier.clone(),
            batch: batch.unwrap_or(BatchSize::Limit(config.sync_batch_limit)),
            inter_call_delay: Duration::from_millis(config.sync_inter_call_delay_ms),
            pricing: config.pricing,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub considered: usize,
    pub created: usize,
    /// Existing storefront products found by handle and linked instead of
    /// created.
    pub reused: usize,
    pub skipped: Vec<SkuIssue>,
    pub failed: Vec<SkuIssue>,
}

impl SyncReport {
    #[must_use]
    pub fn synced(&self) -> usize {
        self.created + self.reused
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Sync summary ---")?;
        writeln!(f, "Considered:          {}", self.considered)?;
        writeln!(f, "Created in Shopify:  {}", self.created)?;
        writeln!(f, "Linked existing:     {}", self.reused)?;
        writeln!(f, "Skipped (no price):  {}", self.skipped.len())?;
        writeln!(f, "Failed:              {}", self.failed.len())?;
        write_sample(f, "Skipped", &self.skipped, ISSUE_SAMPLE)?;
        write_sample(f, "Failed", &self.failed, ISSUE_SAMPLE)
    }
}

/// A positive sell price ready to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Publishable {
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
}

/// Prices a SKU from its stored price row, or gives the skip reason.
pub(crate) fn publishable_price(
    price: Option<&PriceRow>,
    rules: &PricingRules,
) -> Result<Publishable, &'static str> {
    let Some(row) = price else {
        return Err("no price row");
    };
    if row.cost_price.is_none() {
        return Err("no cost price");
    }
    let sell = compute_sell_price(row.cost_price, row.rrp, rules);
    match sell.sell_price {
        Some(price) if sell.is_sellable() => Ok(Publishable {
            price,
            compare_at_price: sell.compare_at_price,
        }),
        _ => Err("no positive sell price"),
    }
}

/// Sleeps between write sequences; the first sequence of a run goes out
/// immediately.
pub(crate) struct Throttle {
    delay: Duration,
    primed: bool,
}

impl Throttle {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            primed: false,
        }
    }

    pub(crate) async fn wait(&mut self) {
        if self.primed && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.primed = true;
    }
}

enum Published {
    Created,
    Reused,
}

async fn publish(
    store: &dyn CatalogStore,
    api: &dyn CatalogApi,
    detail: &ProductDetail,
    price: Publishable,
) -> anyhow::Result<Published> {
    let product = build_new_product(detail);

    let existing = api
        .find_product_by_handle(&product.handle)
        .await
        .context("product lookup failed")?;
    let (ids, outcome) = match existing {
        Some(found) => {
            tracing::warn!(
                sku = %detail.sku,
                handle = %product.handle,
                product_id = %found.product_id,
                "storefront product already exists for handle; linking instead of creating"
            );
            (found, Published::Reused)
        }
        None => {
            let created = api
                .create_product(&product)
                .await
                .context("product create failed")?;
            (created, Published::Created)
        }
    };

    api.update_variant(&VariantUpdate {
        variant_id: ids.variant_id.clone(),
        product_id: ids.product_id.clone(),
        price: price.price,
        compare_at_price: price.compare_at_price,
        sku: detail.sku.as_str().to_string(),
    })
    .await
    .with_context(|| format!("variant update failed for {}", ids.product_id))?;

    store
        .set_external_ids(
            &detail.supplier,
            &detail.sku,
            &ExternalIds {
                product_id: ids.product_id.clone(),
                variant_id: Some(ids.variant_id),
            },
        )
        .await
        .with_context(|| format!("{} published but its id was not recorded", ids.product_id))?;

    Ok(outcome)
}

async fn sync_one(
    store: &dyn CatalogStore,
    api: &dyn CatalogApi,
    options: &SyncOptions,
    throttle: &mut Throttle,
    stored: &StoredDetail,
    report: &mut SyncReport,
) {
    let detail = &stored.detail;

    let row = match store.get_price(&options.supplier, &detail.sku).await {
        Ok(row) => row,
        Err(e) => {
            tracing::error!(sku = %detail.sku, error = %e, "failed to read price row");
            report
                .failed
                .push(SkuIssue::new(&detail.sku, format!("price lookup failed: {e}")));
            return;
        }
    };
    let price = match publishable_price(row.as_ref(), &options.pricing) {
        Ok(price) => price,
        Err(reason) => {
            tracing::debug!(sku = %detail.sku, reason, "skipping SKU");
            report.skipped.push(SkuIssue::new(&detail.sku, reason));
            return;
        }
    };

    throttle.wait().await;
    match publish(store, api, detail, price).await {
        Ok(Published::Created) => {
            report.created += 1;
            if report.created % PROGRESS_EVERY == 0 {
                tracing::info!(created = report.created, "sync progress");
            }
        }
        Ok(Published::Reused) => report.reused += 1,
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(sku = %detail.sku, error = %message, "failed to sync SKU");
            report.failed.push(SkuIssue::new(&detail.sku, message));
        }
    }
}

/// Runs one sync batch over the pending SKUs of `options.supplier`, in SKU
/// order.
///
/// # Errors
///
/// Returns an error only if the batch cannot be selected. Per-SKU failures
/// are recorded in the report and never abort the batch.
pub async fn sync_catalog(
    store: &dyn CatalogStore,
    api: &dyn CatalogApi,
    options: &SyncOptions,
) -> anyhow::Result<SyncReport> {
    let limit = options.batch.as_limit();
    let batch = store
        .list_pending_details(&options.supplier, limit)
        .await
        .context("failed to select pending SKUs")?;
    tracing::info!(
        supplier = %options.supplier,
        pending = batch.len(),
        limit,
        "starting sync batch"
    );

    let mut report = SyncReport::default();
    let mut throttle = Throttle::new(options.inter_call_delay);
    for stored in &batch {
        report.considered += 1;
        sync_one(store, api, options, &mut throttle, stored, &mut report).await;
    }

    tracing::info!(
        considered = report.considered,
        created = report.created,
        reused = report.reused,
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "sync batch finished"
    );
    Ok(report)
}
