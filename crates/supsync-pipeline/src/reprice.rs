//! Price refresh for SKUs that are already on the storefront.
//!
//! Only the variant update is sent. Products are never created here, so
//! running it against a partially synced catalog is safe.

use std::fmt;

use anyhow::Context;
use supsync_core::StoredDetail;
use supsync_db::CatalogStore;
use supsync_shopify::{CatalogApi, VariantUpdate};

use crate::report::{write_sample, SkuIssue};
use crate::sync::{publishable_price, SyncOptions, Throttle};

const ISSUE_SAMPLE: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepriceReport {
    pub considered: usize,
    pub updated: usize,
    pub skipped: Vec<SkuIssue>,
    pub failed: Vec<SkuIssue>,
}

impl fmt::Display for RepriceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Reprice summary ---")?;
        writeln!(f, "Considered:  {}", self.considered)?;
        writeln!(f, "Updated:     {}", self.updated)?;
        writeln!(f, "Skipped:     {}", self.skipped.len())?;
        writeln!(f, "Failed:      {}", self.failed.len())?;
        write_sample(f, "Skipped", &self.skipped, ISSUE_SAMPLE)?;
        write_sample(f, "Failed", &self.failed, ISSUE_SAMPLE)
    }
}

/// Recomputes the sell price of up to `options.batch` synced SKUs and pushes
/// it to their recorded variants.
///
/// # Errors
///
/// Returns an error only if the synced SKUs cannot be listed; per-SKU
/// failures are recorded in the report.
pub async fn reprice_catalog(
    store: &dyn CatalogStore,
    api: &dyn CatalogApi,
    options: &SyncOptions,
) -> anyhow::Result<RepriceReport> {
    let limit = usize::try_from(options.batch.as_limit()).unwrap_or(usize::MAX);
    let synced: Vec<StoredDetail> = store
        .list_details(&options.supplier, None)
        .await
        .context("failed to list synced SKUs")?
        .into_iter()
        .filter(StoredDetail::is_synced)
        .take(limit)
        .collect();

    let mut report = RepriceReport::default();
    let mut throttle = Throttle::new(options.inter_call_delay);

    for stored in &synced {
        report.considered += 1;
        let sku = &stored.detail.sku;

        let Some(ids) = stored.external.as_ref() else {
            continue;
        };
        let Some(variant_id) = ids.variant_id.clone() else {
            report
                .skipped
                .push(SkuIssue::new(sku, "no variant id recorded"));
            continue;
        };

        let row = match store.get_price(&options.supplier, sku).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(%sku, error = %e, "failed to read price row");
                report
                    .failed
                    .push(SkuIssue::new(sku, format!("price lookup failed: {e}")));
                continue;
            }
        };
        let price = match publishable_price(row.as_ref(), &options.pricing) {
            Ok(price) => price,
            Err(reason) => {
                report.skipped.push(SkuIssue::new(sku, reason));
                continue;
            }
        };

        throttle.wait().await;
        let update = VariantUpdate {
            variant_id,
            product_id: ids.product_id.clone(),
            price: price.price,
            compare_at_price: price.compare_at_price,
            sku: sku.as_str().to_string(),
        };
        match api.update_variant(&update).await {
            Ok(()) => report.updated += 1,
            Err(e) => {
                tracing::error!(%sku, error = %e, "failed to update variant price");
                report.failed.push(SkuIssue::new(sku, e.to_string()));
            }
        }
    }

    tracing::info!(
        considered = report.considered,
        updated = report.updated,
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "reprice finished"
    );
    Ok(report)
}
