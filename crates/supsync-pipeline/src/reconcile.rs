//! Cross-feed reconciliation: which SKUs have details but no price, and
//! which have a price but no details.

use std::collections::BTreeSet;
use std::fmt;

use supsync_core::NormalizedSku;
use supsync_db::{CatalogStore, DbError};

use crate::report::write_sample;

const SAMPLE: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub detail_count: usize,
    pub price_count: usize,
    pub matched_count: usize,
    /// Sorted.
    pub details_without_price: Vec<NormalizedSku>,
    /// Sorted.
    pub price_without_details: Vec<NormalizedSku>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_fully_matched(&self) -> bool {
        self.details_without_price.is_empty() && self.price_without_details.is_empty()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Reconciliation ---")?;
        writeln!(f, "SKUs with details:        {}", self.detail_count)?;
        writeln!(f, "SKUs with price:          {}", self.price_count)?;
        writeln!(f, "SKUs with both:           {}", self.matched_count)?;
        writeln!(
            f,
            "Details without price:    {}",
            self.details_without_price.len()
        )?;
        writeln!(
            f,
            "Price without details:    {}",
            self.price_without_details.len()
        )?;
        write_sample(f, "Details without price", &self.details_without_price, SAMPLE)?;
        write_sample(f, "Price without details", &self.price_without_details, SAMPLE)
    }
}

/// Joins two SKU lists. Duplicates in either input are ignored.
#[must_use]
pub fn reconcile_skus(details: &[NormalizedSku], prices: &[NormalizedSku]) -> ReconcileReport {
    let details: BTreeSet<&NormalizedSku> = details.iter().collect();
    let prices: BTreeSet<&NormalizedSku> = prices.iter().collect();

    ReconcileReport {
        detail_count: details.len(),
        price_count: prices.len(),
        matched_count: details.intersection(&prices).count(),
        details_without_price: details.difference(&prices).map(|s| (*s).clone()).collect(),
        price_without_details: prices.difference(&details).map(|s| (*s).clone()).collect(),
    }
}

/// Reconciles the stored details and prices for `supplier`.
///
/// # Errors
///
/// Returns [`DbError`] if either SKU list cannot be read.
pub async fn reconcile(store: &dyn CatalogStore, supplier: &str) -> Result<ReconcileReport, DbError> {
    let details = store.list_detail_skus(supplier).await?;
    let prices = store.list_price_skus(supplier).await?;
    let report = reconcile_skus(&details, &prices);

    if !report.is_fully_matched() {
        tracing::warn!(
            details_without_price = report.details_without_price.len(),
            price_without_details = report.price_without_details.len(),
            "feeds are not fully reconciled"
        );
    }
    Ok(report)
}
