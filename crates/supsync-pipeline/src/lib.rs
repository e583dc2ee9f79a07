//! Supplier feed import, reconciliation, and storefront sync.
//!
//! Stages are independent and safe to re-run: imports upsert-replace per
//! SKU, and sync only touches SKUs with no recorded storefront id.

pub mod import;
pub mod payload;
pub mod reconcile;
pub mod report;
pub mod reprice;
pub mod sync;

pub use import::{
    import_details, import_details_feed, import_price_feed, import_prices, load_details_feed,
    load_price_feed, ImportSummary, PriceImportReport,
};
pub use payload::{build_new_product, product_handle, slugify};
pub use reconcile::{reconcile, reconcile_skus, ReconcileReport};
pub use report::SkuIssue;
pub use reprice::{reprice_catalog, RepriceReport};
pub use sync::{sync_catalog, BatchSize, SyncOptions, SyncReport, ALL_CAP};
