//! Live integration tests for supsync-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/supsync-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use supsync_core::{
    AssembledDimensions, ComplianceLinks, ExternalIds, NormalizedSku, PackagingBox, PriceRow,
    ProductDetail,
};
use supsync_db::{
    get_price, list_detail_skus, list_details, list_pending_details, list_price_skus,
    set_external_ids, upsert_detail, upsert_price, CatalogStore, DbError, PgCatalogStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sku(raw: &str) -> NormalizedSku {
    NormalizedSku::new(raw).unwrap()
}

fn make_detail(raw_sku: &str, name: &str) -> ProductDetail {
    ProductDetail {
        supplier: "FTG".to_string(),
        sku: sku(raw_sku),
        product_id: Some("P-1".to_string()),
        ean: None,
        commodity_code: None,
        range: Some("Oslo".to_string()),
        name: Some(name.to_string()),
        description: Some("Three seater".to_string()),
        finish: None,
        assembled: AssembledDimensions {
            width_cm: Some(200.0),
            height_cm: Some(85.0),
            depth_cm: None,
            weight_kg: Some(41.5),
        },
        boxes: vec![PackagingBox {
            box_index: 2,
            ean: Some("5055000000002".to_string()),
            length_cm: Some(120.0),
            width_cm: None,
            height_cm: None,
            volume_m3: Some(0.4),
            weight_kg: None,
        }],
        images: vec!["https://cdn.example.com/1.jpg".to_string()],
        categories: BTreeMap::from([("C1".to_string(), true), ("C2".to_string(), false)]),
        compliance: ComplianceLinks::default(),
    }
}

fn make_price(raw_sku: &str, cost: Decimal) -> PriceRow {
    PriceRow {
        supplier: "FTG".to_string(),
        sku: sku(raw_sku),
        cost_price: Some(cost),
        rrp: Some(Decimal::new(19999, 2)),
        trade_price: None,
        vat_rate: Some(Decimal::new(20, 0)),
        stock_qty: Some(12.0),
        availability_status: Some("In Stock".to_string()),
        lead_time_days: Some(14.0),
        discontinued: Some(false),
        raw: None,
    }
}

fn ids(n: u32) -> ExternalIds {
    ExternalIds {
        product_id: format!("gid://shopify/Product/{n}"),
        variant_id: Some(format!("gid://shopify/ProductVariant/{n}")),
    }
}

// ---------------------------------------------------------------------------
// supplier_products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn detail_round_trips_nested_documents(pool: sqlx::PgPool) {
    let detail = make_detail("FTG001", "Oslo Sofa");
    upsert_detail(&pool, &detail).await.expect("upsert_detail");

    let rows = list_details(&pool, "FTG", None).await.expect("list_details");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].detail, detail);
    assert!(rows[0].external.is_none());
    assert!(rows[0].synced_at.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn reimport_replaces_fields_and_keeps_external_ids(pool: sqlx::PgPool) {
    upsert_detail(&pool, &make_detail("FTG001", "Old Name"))
        .await
        .unwrap();
    set_external_ids(&pool, "FTG", &sku("FTG001"), &ids(1))
        .await
        .expect("set_external_ids");

    let mut updated = make_detail("FTG001", "New Name");
    updated.boxes.clear();
    upsert_detail(&pool, &updated).await.unwrap();

    let rows = list_details(&pool, "FTG", None).await.unwrap();
    assert_eq!(rows.len(), 1, "upsert must not duplicate the SKU");
    assert_eq!(rows[0].detail.name.as_deref(), Some("New Name"));
    assert!(rows[0].detail.boxes.is_empty());
    assert_eq!(rows[0].external, Some(ids(1)));
    assert!(rows[0].synced_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn listings_are_ordered_and_limited(pool: sqlx::PgPool) {
    for raw in ["C3", "A1", "B2"] {
        upsert_detail(&pool, &make_detail(raw, raw)).await.unwrap();
    }

    let skus = list_detail_skus(&pool, "FTG").await.unwrap();
    assert_eq!(skus, vec![sku("A1"), sku("B2"), sku("C3")]);

    let first_two = list_details(&pool, "FTG", Some(2)).await.unwrap();
    let got: Vec<_> = first_two.iter().map(|d| d.detail.sku.as_str()).collect();
    assert_eq!(got, vec!["A1", "B2"]);

    assert!(list_details(&pool, "OTHER", None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn pending_details_skip_published_rows(pool: sqlx::PgPool) {
    for raw in ["A1", "B2", "C3"] {
        upsert_detail(&pool, &make_detail(raw, raw)).await.unwrap();
    }
    set_external_ids(&pool, "FTG", &sku("B2"), &ids(2))
        .await
        .unwrap();

    let pending = list_pending_details(&pool, "FTG", 10).await.unwrap();
    let got: Vec<_> = pending.iter().map(|d| d.detail.sku.as_str()).collect();
    assert_eq!(got, vec!["A1", "C3"]);

    let one = list_pending_details(&pool, "FTG", 1).await.unwrap();
    assert_eq!(one.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn set_external_ids_for_unknown_sku_is_not_found(pool: sqlx::PgPool) {
    let err = set_external_ids(&pool, "FTG", &sku("MISSING"), &ids(9))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// supplier_product_pricing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn price_round_trips_and_upsert_replaces(pool: sqlx::PgPool) {
    let first = make_price("FTG001", Decimal::new(10000, 2));
    upsert_price(&pool, &first, "GBP").await.expect("upsert_price");

    let stored = get_price(&pool, "FTG", &sku("FTG001"))
        .await
        .unwrap()
        .expect("price row");
    assert_eq!(stored, first);

    let mut second = make_price("FTG001", Decimal::new(12050, 2));
    second.rrp = None;
    second.discontinued = None;
    upsert_price(&pool, &second, "GBP").await.unwrap();

    let stored = get_price(&pool, "FTG", &sku("FTG001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.cost_price, Some(Decimal::new(12050, 2)));
    assert!(stored.rrp.is_none(), "absent fields must be cleared");
    assert!(stored.discontinued.is_none());

    assert_eq!(list_price_skus(&pool, "FTG").await.unwrap(), vec![sku("FTG001")]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_price_is_none(pool: sqlx::PgPool) {
    let price = get_price(&pool, "FTG", &sku("NOPE")).await.unwrap();
    assert!(price.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn pg_store_delegates_to_queries(pool: sqlx::PgPool) {
    let store = PgCatalogStore::new(pool);
    store
        .upsert_detail(&make_detail("A1", "Chair"))
        .await
        .unwrap();
    store
        .upsert_price(&make_price("A1", Decimal::new(5000, 2)), "GBP")
        .await
        .unwrap();

    assert_eq!(store.list_detail_skus("FTG").await.unwrap(), vec![sku("A1")]);
    assert_eq!(store.list_price_skus("FTG").await.unwrap(), vec![sku("A1")]);
    assert_eq!(store.list_pending_details("FTG", 5).await.unwrap().len(), 1);

    store
        .set_external_ids("FTG", &sku("A1"), &ids(7))
        .await
        .unwrap();
    assert!(store.list_pending_details("FTG", 5).await.unwrap().is_empty());
}
