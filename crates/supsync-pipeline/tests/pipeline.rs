//! End-to-end pipeline tests against the in-memory store and a recording
//! fake of the storefront API. No database or network is needed.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use supsync_core::{
    AppConfig, AssembledDimensions, ComplianceLinks, Environment, NormalizedSku, PriceRow,
    PricingRules, ProductDetail,
};
use supsync_db::{CatalogStore, MemoryCatalogStore};
use supsync_feeds::ParsedFeed;
use supsync_pipeline::{
    import_details, import_details_feed, import_price_feed, import_prices, reconcile,
    reprice_catalog, sync_catalog, BatchSize, SyncOptions,
};
use supsync_shopify::{CatalogApi, CreatedProduct, NewProduct, ShopifyError, VariantUpdate};

// ---------------------------------------------------------------------------
// Fake storefront
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeCatalog {
    created: Mutex<Vec<NewProduct>>,
    updates: Mutex<Vec<VariantUpdate>>,
    lookups: Mutex<Vec<String>>,
    /// Products already on the storefront, by handle.
    existing: Mutex<BTreeMap<String, CreatedProduct>>,
    fail_create_for: HashSet<String>,
    fail_update: bool,
}

impl FakeCatalog {
    fn failing_create(handles: &[&str]) -> Self {
        Self {
            fail_create_for: handles.iter().map(|h| (*h).to_string()).collect(),
            ..Self::default()
        }
    }

    fn failing_update() -> Self {
        Self {
            fail_update: true,
            ..Self::default()
        }
    }

    fn create_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    fn created_handles(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.handle.clone())
            .collect()
    }

    fn updates(&self) -> Vec<VariantUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn find_product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<CreatedProduct>, ShopifyError> {
        self.lookups.lock().unwrap().push(handle.to_string());
        Ok(self.existing.lock().unwrap().get(handle).cloned())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, ShopifyError> {
        if self.fail_create_for.contains(&product.handle) {
            return Err(ShopifyError::UserErrors(vec![
                "Handle has already been taken".to_string(),
            ]));
        }
        let mut created = self.created.lock().unwrap();
        created.push(product.clone());
        let n = created.len();
        let ids = CreatedProduct {
            product_id: format!("gid://shopify/Product/{n}"),
            variant_id: format!("gid://shopify/ProductVariant/{n}"),
        };
        self.existing
            .lock()
            .unwrap()
            .insert(product.handle.clone(), ids.clone());
        Ok(ids)
    }

    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), ShopifyError> {
        if self.fail_update {
            return Err(ShopifyError::GraphQL(vec!["Throttled".to_string()]));
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn sku(raw: &str) -> NormalizedSku {
    NormalizedSku::new(raw).unwrap()
}

fn detail(raw_sku: &str, name: &str) -> ProductDetail {
    ProductDetail {
        supplier: "FTG".to_string(),
        sku: sku(raw_sku),
        product_id: None,
        ean: None,
        commodity_code: None,
        range: None,
        name: Some(name.to_string()),
        description: None,
        finish: None,
        assembled: AssembledDimensions::default(),
        boxes: Vec::new(),
        images: Vec::new(),
        categories: BTreeMap::new(),
        compliance: ComplianceLinks::default(),
    }
}

fn price(raw_sku: &str, cost: Option<i64>, rrp: Option<i64>) -> PriceRow {
    PriceRow {
        supplier: "FTG".to_string(),
        sku: sku(raw_sku),
        cost_price: cost.map(|c| Decimal::new(c, 0)),
        rrp: rrp.map(|r| Decimal::new(r, 0)),
        trade_price: None,
        vat_rate: None,
        stock_qty: Some(5.0),
        availability_status: None,
        lead_time_days: None,
        discontinued: None,
        raw: None,
    }
}

fn options(batch: BatchSize) -> SyncOptions {
    SyncOptions {
        supplier: "FTG".to_string(),
        batch,
        inter_call_delay: Duration::ZERO,
        pricing: PricingRules::default(),
    }
}

async fn seeded_store(details: &[ProductDetail], prices: &[PriceRow]) -> MemoryCatalogStore {
    let store = MemoryCatalogStore::new();
    import_details(&store, &ParsedFeed::from_records(details.to_vec())).await;
    import_prices(&store, "FTG", &ParsedFeed::from_records(prices.to_vec()), "GBP")
        .await
        .unwrap();
    store
}

fn test_config(feed_dir: PathBuf) -> AppConfig {
    AppConfig {
        database_url: None,
        env: Environment::Test,
        log_level: "info".to_string(),
        supplier: "FTG".to_string(),
        currency: "GBP".to_string(),
        feed_dir,
        details_csv_path: None,
        price_csv_path: None,
        db_max_connections: 1,
        db_min_connections: 1,
        db_acquire_timeout_secs: 1,
        shopify: None,
        shopify_request_timeout_secs: 5,
        sync_inter_call_delay_ms: 0,
        sync_batch_limit: 50,
        pricing: PricingRules::default(),
    }
}

// ---------------------------------------------------------------------------
// Import + reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn feeds_reconcile_with_one_miss_in_each_direction() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Product Details - ALL PRODUCTS.csv"),
        "Identity,,\nSKU,Name,Range\nftg-001,Oslo Sofa,Oslo\nFTG 002,Oslo Chair,Oslo\nFTG003,Bergen Bed,Bergen\n,Orphan Stool,Oslo\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("FTG Price List.csv"),
        "SKU,Cost,RRP\nFTG001,100,130\nftg-002,80,\n  ,5,9\nFTG999,10,20\n",
    )
    .unwrap();
    let config = test_config(dir.path().to_path_buf());
    let store = MemoryCatalogStore::new();

    let details = import_details_feed(&store, &config, None).await.unwrap();
    assert_eq!(details.read, 4);
    assert_eq!(details.upserted, 3);
    assert_eq!(details.skipped, 1);
    assert_eq!(details.failed, 0);
    assert!(details.to_string().contains("Rows skipped:   1"), "got: {details}");

    let prices = import_price_feed(&store, &config, None).await.unwrap();
    assert_eq!(prices.summary.read, 4);
    assert_eq!(prices.summary.upserted, 3);
    assert_eq!(prices.summary.skipped, 1);
    assert_eq!(prices.matched, vec![sku("FTG001"), sku("FTG002")]);
    assert_eq!(prices.missing_details, vec![sku("FTG999")]);
    assert_eq!(store.price_currency("FTG", &sku("FTG001")).as_deref(), Some("GBP"));

    let report = reconcile(&store, "FTG").await.unwrap();
    assert_eq!(report.details_without_price, vec![sku("FTG003")]);
    assert_eq!(report.price_without_details, vec![sku("FTG999")]);
    assert_eq!(report.matched_count, 2);
}

#[tokio::test]
async fn reimport_replaces_rows_without_duplicating() {
    let store = seeded_store(&[detail("A1", "Old")], &[]).await;
    let feed = ParsedFeed::from_records(vec![detail("A1", "New"), detail("B2", "Other")]);
    let summary = import_details(&store, &feed).await;

    assert_eq!(summary.upserted, 2);
    assert_eq!(store.detail_count(), 2);
    let rows = store.list_details("FTG", None).await.unwrap();
    assert_eq!(rows[0].detail.name.as_deref(), Some("New"));
}

#[tokio::test]
async fn missing_feed_file_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("unrelated.csv"), "x").unwrap();
    let config = test_config(dir.path().to_path_buf());
    let store = MemoryCatalogStore::new();

    let err = import_details_feed(&store, &config, None).await.unwrap_err();
    assert!(format!("{err:#}").contains("unrelated.csv"), "got: {err:#}");
    assert_eq!(store.detail_count(), 0);
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_publishes_priced_skus_and_skips_unpriced() {
    let store = seeded_store(
        &[detail("A1", "Oslo Sofa"), detail("B2", "Chair"), detail("C3", "Lamp")],
        &[price("A1", Some(100), Some(200)), price("B2", None, Some(50))],
    )
    .await;
    let api = FakeCatalog::default();

    let report = sync_catalog(&store, &api, &options(BatchSize::Limit(50)))
        .await
        .unwrap();

    assert_eq!(report.considered, 3);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].sku, sku("B2"));
    assert_eq!(report.skipped[0].reason, "no cost price");
    assert_eq!(report.skipped[1].reason, "no price row");
    assert!(report.failed.is_empty());

    let updates = api.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].price, Decimal::new(145, 0));
    assert_eq!(updates[0].compare_at_price, Some(Decimal::new(200, 0)));
    assert_eq!(updates[0].sku, "A1");

    let rows = store.list_details("FTG", None).await.unwrap();
    let a1 = rows[0].external.as_ref().expect("A1 synced");
    assert_eq!(a1.product_id, "gid://shopify/Product/1");
    assert_eq!(a1.variant_id.as_deref(), Some("gid://shopify/ProductVariant/1"));
    assert!(rows[1].external.is_none());
}

#[tokio::test]
async fn second_sync_run_never_recreates_a_synced_sku() {
    let store = seeded_store(&[detail("X1", "Sofa")], &[price("X1", Some(100), None)]).await;
    let api = FakeCatalog::default();

    let first = sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();
    let second = sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();

    assert_eq!(first.created, 1);
    assert_eq!(second.considered, 0);
    assert_eq!(api.create_count(), 1);
}

#[tokio::test]
async fn one_failed_sku_does_not_abort_the_batch() {
    let store = seeded_store(
        &[detail("A1", "a"), detail("B2", "b"), detail("C3", "c")],
        &[
            price("A1", Some(10), None),
            price("B2", Some(10), None),
            price("C3", Some(10), None),
        ],
    )
    .await;
    let api = FakeCatalog::failing_create(&["b2-b2"]);

    let report = sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].sku, sku("B2"));
    assert!(
        report.failed[0].reason.contains("Handle has already been taken"),
        "reason: {}",
        report.failed[0].reason
    );
    assert_eq!(api.created_handles(), vec!["a1-a1", "c3-c3"]);

    let pending = store.list_pending_details("FTG", 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].detail.sku, sku("B2"));
}

#[tokio::test]
async fn variant_update_failure_leaves_sku_pending() {
    let store = seeded_store(&[detail("A1", "a")], &[price("A1", Some(10), None)]).await;
    let api = FakeCatalog::failing_update();

    let report = sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.contains("variant update failed"));
    assert_eq!(store.list_pending_details("FTG", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn orphan_from_interrupted_run_is_linked_not_recreated() {
    let store = seeded_store(&[detail("A1", "a")], &[price("A1", Some(10), None)]).await;
    store.fail_external_id_writes("FTG", &sku("A1"));
    let api = FakeCatalog::default();

    // Product is created but its id cannot be recorded.
    let first = sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();
    assert_eq!(first.failed.len(), 1);
    assert!(first.failed[0].reason.contains("was not recorded"));
    assert_eq!(api.create_count(), 1);

    let store_after_restart = seeded_store(&[detail("A1", "a")], &[price("A1", Some(10), None)]).await;
    let second = sync_catalog(&store_after_restart, &api, &options(BatchSize::All))
        .await
        .unwrap();

    assert_eq!(second.reused, 1);
    assert_eq!(second.created, 0);
    assert_eq!(api.create_count(), 1, "no second storefront product");
    let rows = store_after_restart.list_details("FTG", None).await.unwrap();
    assert_eq!(
        rows[0].external.as_ref().map(|e| e.product_id.as_str()),
        Some("gid://shopify/Product/1")
    );
}

#[tokio::test]
async fn limited_batches_progress_through_the_catalog() {
    let store = seeded_store(
        &[detail("A1", "a"), detail("B2", "b"), detail("C3", "c")],
        &[
            price("A1", Some(10), None),
            price("B2", Some(10), None),
            price("C3", Some(10), None),
        ],
    )
    .await;
    let api = FakeCatalog::default();

    for _ in 0..3 {
        let report = sync_catalog(&store, &api, &options(BatchSize::Limit(1)))
            .await
            .unwrap();
        assert_eq!(report.considered, 1);
        assert_eq!(report.created, 1);
    }
    assert_eq!(api.created_handles(), vec!["a1-a1", "b2-b2", "c3-c3"]);
}

fn throttled(batch: BatchSize, delay_ms: u64) -> SyncOptions {
    SyncOptions {
        inter_call_delay: Duration::from_millis(delay_ms),
        ..options(batch)
    }
}

#[tokio::test(start_paused = true)]
async fn sync_waits_between_published_skus_only() {
    let store = seeded_store(
        &[detail("A1", "a"), detail("B2", "b"), detail("C3", "c")],
        &[
            price("A1", Some(10), None),
            price("B2", Some(10), None),
            price("C3", Some(10), None),
        ],
    )
    .await;
    let api = FakeCatalog::default();

    let started = tokio::time::Instant::now();
    let report = sync_catalog(&store, &api, &throttled(BatchSize::All, 400))
        .await
        .unwrap();

    assert_eq!(report.created, 3);
    assert_eq!(started.elapsed(), Duration::from_millis(800));
}

#[tokio::test(start_paused = true)]
async fn skipped_skus_add_no_delay() {
    let store = seeded_store(
        &[detail("A1", "a"), detail("B2", "b"), detail("C3", "c"), detail("D4", "d")],
        &[price("A1", Some(10), None), price("D4", Some(10), None)],
    )
    .await;
    let api = FakeCatalog::default();

    let started = tokio::time::Instant::now();
    let report = sync_catalog(&store, &api, &throttled(BatchSize::All, 400))
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(started.elapsed(), Duration::from_millis(400));
}

// ---------------------------------------------------------------------------
// Reprice
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reprice_updates_synced_variants_without_creating() {
    let store = seeded_store(
        &[detail("A1", "a"), detail("B2", "b")],
        &[price("A1", Some(100), None)],
    )
    .await;
    let api = FakeCatalog::default();
    sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();
    assert_eq!(api.create_count(), 1);

    // New supplier cost with an RRP.
    let repriced = ParsedFeed::from_records(vec![price("A1", Some(100), Some(200))]);
    import_prices(&store, "FTG", &repriced, "GBP").await.unwrap();
    let report = reprice_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();

    assert_eq!(report.considered, 1, "only synced SKUs are repriced");
    assert_eq!(report.updated, 1);
    assert_eq!(api.create_count(), 1);

    let updates = api.updates();
    let last = updates.last().unwrap();
    assert_eq!(last.price, Decimal::new(145, 0));
    assert_eq!(last.compare_at_price, Some(Decimal::new(200, 0)));
    assert_eq!(last.product_id, "gid://shopify/Product/1");
}

#[tokio::test(start_paused = true)]
async fn reprice_waits_between_variant_updates() {
    let store = seeded_store(
        &[detail("A1", "a"), detail("B2", "b")],
        &[price("A1", Some(100), None), price("B2", Some(50), None)],
    )
    .await;
    let api = FakeCatalog::default();
    sync_catalog(&store, &api, &options(BatchSize::All))
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    let report = reprice_catalog(&store, &api, &throttled(BatchSize::All, 250))
        .await
        .unwrap();

    assert_eq!(report.updated, 2);
    assert_eq!(started.elapsed(), Duration::from_millis(250));
}
