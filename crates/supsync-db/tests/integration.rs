//! Offline tests for supsync-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use std::collections::BTreeMap;
use std::path::PathBuf;

use sqlx::types::Json;
use supsync_core::{AppConfig, AssembledDimensions, Environment, PriceRow, PricingRules, StoredDetail};
use supsync_db::{DbError, PoolConfig, PricingRow, SupplierProductRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        supplier: "FTG".to_string(),
        currency: "GBP".to_string(),
        feed_dir: PathBuf::from("."),
        details_csv_path: None,
        price_csv_path: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        shopify: None,
        shopify_request_timeout_secs: 30,
        sync_inter_call_delay_ms: 400,
        sync_batch_limit: 50,
        pricing: PricingRules::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

fn product_row(sku: &str) -> SupplierProductRow {
    SupplierProductRow {
        supplier: "FTG".to_string(),
        sku: sku.to_string(),
        product_id: None,
        ean: Some("5055".to_string()),
        commodity_code: None,
        range_name: Some("Oslo".to_string()),
        name: Some("Oslo Sofa".to_string()),
        description: None,
        finish: None,
        assembled: Json(AssembledDimensions {
            width_cm: Some(200.0),
            ..AssembledDimensions::default()
        }),
        boxes: Json(Vec::new()),
        images: Json(vec!["https://cdn.example.com/1.jpg".to_string()]),
        categories: Json(BTreeMap::from([("C1".to_string(), true)])),
        fr_fabric_url: None,
        fr_foam_url: Some("https://cdn.example.com/foam.pdf".to_string()),
        shopify_product_id: Some("gid://shopify/Product/1".to_string()),
        shopify_variant_id: None,
        synced_at: None,
    }
}

#[test]
fn product_row_converts_to_stored_detail() {
    let stored = StoredDetail::try_from(product_row("FTG001")).unwrap();

    assert_eq!(stored.detail.sku.as_str(), "FTG001");
    assert_eq!(stored.detail.range.as_deref(), Some("Oslo"));
    assert_eq!(stored.detail.assembled.width_cm, Some(200.0));
    assert_eq!(stored.detail.categories.get("C1"), Some(&true));
    assert_eq!(
        stored.detail.compliance.fr_foam_url.as_deref(),
        Some("https://cdn.example.com/foam.pdf")
    );
    let external = stored.external.expect("external ids");
    assert_eq!(external.product_id, "gid://shopify/Product/1");
    assert!(external.variant_id.is_none());
}

#[test]
fn product_row_with_blank_sku_is_invalid() {
    let err = StoredDetail::try_from(product_row("  ")).unwrap_err();
    assert!(matches!(err, DbError::InvalidRow { .. }), "got: {err:?}");
}

#[test]
fn pricing_row_converts_without_raw_cells() {
    let row = PricingRow {
        supplier: "FTG".to_string(),
        sku: "FTG001".to_string(),
        cost_price: Some(rust_decimal::Decimal::new(10000, 2)),
        rrp: None,
        trade_price: None,
        vat_rate: None,
        currency: "GBP".to_string(),
        stock_qty: Some(4.0),
        availability_status: Some("In Stock".to_string()),
        lead_time_days: None,
        discontinued: Some(false),
    };

    let price = PriceRow::try_from(row).unwrap();
    assert_eq!(price.sku.as_str(), "FTG001");
    assert_eq!(price.stock_qty, Some(4.0));
    assert!(price.raw.is_none());
}
