//! Database operations for `supplier_products`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use supsync_core::{
    AssembledDimensions, ComplianceLinks, ExternalIds, NormalizedSku, PackagingBox,
    ProductDetail, StoredDetail,
};

use crate::DbError;

const SELECT_COLUMNS: &str = "supplier, sku, product_id, ean, commodity_code, range_name, name, \
     description, finish, assembled, boxes, images, categories, fr_fabric_url, fr_foam_url, \
     shopify_product_id, shopify_variant_id, synced_at";

/// A row from the `supplier_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierProductRow {
    pub supplier: String,
    pub sku: String,
    pub product_id: Option<String>,
    pub ean: Option<String>,
    pub commodity_code: Option<String>,
    pub range_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub finish: Option<String>,
    pub assembled: Json<AssembledDimensions>,
    pub boxes: Json<Vec<PackagingBox>>,
    pub images: Json<Vec<String>>,
    pub categories: Json<BTreeMap<String, bool>>,
    pub fr_fabric_url: Option<String>,
    pub fr_foam_url: Option<String>,
    pub shopify_product_id: Option<String>,
    pub shopify_variant_id: Option<String>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl TryFrom<SupplierProductRow> for StoredDetail {
    type Error = DbError;

    fn try_from(row: SupplierProductRow) -> Result<Self, Self::Error> {
        let sku = NormalizedSku::new(&row.sku).ok_or_else(|| DbError::InvalidRow {
            supplier: row.supplier.clone(),
            sku: row.sku.clone(),
            reason: "blank sku".to_string(),
        })?;

        let external = row.shopify_product_id.map(|product_id| ExternalIds {
            product_id,
            variant_id: row.shopify_variant_id,
        });

        Ok(StoredDetail {
            detail: ProductDetail {
                supplier: row.supplier,
                sku,
                product_id: row.product_id,
                ean: row.ean,
                commodity_code: row.commodity_code,
                range: row.range_name,
                name: row.name,
                description: row.description,
                finish: row.finish,
                assembled: row.assembled.0,
                boxes: row.boxes.0,
                images: row.images.0,
                categories: row.categories.0,
                compliance: ComplianceLinks {
                    fr_fabric_url: row.fr_fabric_url,
                    fr_foam_url: row.fr_foam_url,
                },
            },
            external,
            synced_at: row.synced_at,
        })
    }
}

/// Inserts or wholly replaces the detail row for `(supplier, sku)`.
///
/// The storefront id columns and `synced_at` are left untouched on conflict,
/// so re-importing a published SKU keeps it published.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_detail(pool: &PgPool, detail: &ProductDetail) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO supplier_products \
             (supplier, sku, product_id, ean, commodity_code, range_name, name, description, \
              finish, assembled, boxes, images, categories, fr_fabric_url, fr_foam_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 $9, $10, $11, $12, $13, $14, $15) \
         ON CONFLICT (supplier, sku) DO UPDATE SET \
             product_id     = EXCLUDED.product_id, \
             ean            = EXCLUDED.ean, \
             commodity_code = EXCLUDED.commodity_code, \
             range_name     = EXCLUDED.range_name, \
             name           = EXCLUDED.name, \
             description    = EXCLUDED.description, \
             finish         = EXCLUDED.finish, \
             assembled      = EXCLUDED.assembled, \
             boxes          = EXCLUDED.boxes, \
             images         = EXCLUDED.images, \
             categories     = EXCLUDED.categories, \
             fr_fabric_url  = EXCLUDED.fr_fabric_url, \
             fr_foam_url    = EXCLUDED.fr_foam_url, \
             updated_at     = NOW()",
    )
    .bind(&detail.supplier)
    .bind(detail.sku.as_str())
    .bind(&detail.product_id)
    .bind(&detail.ean)
    .bind(&detail.commodity_code)
    .bind(&detail.range)
    .bind(&detail.name)
    .bind(&detail.description)
    .bind(&detail.finish)
    .bind(Json(&detail.assembled))
    .bind(Json(&detail.boxes))
    .bind(Json(&detail.images))
    .bind(Json(&detail.categories))
    .bind(&detail.compliance.fr_fabric_url)
    .bind(&detail.compliance.fr_foam_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Lists detail rows for `supplier` ordered by SKU. `None` means no limit.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// for a row with a blank SKU.
pub async fn list_details(
    pool: &PgPool,
    supplier: &str,
    limit: Option<i64>,
) -> Result<Vec<StoredDetail>, DbError> {
    let rows = sqlx::query_as::<_, SupplierProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM supplier_products \
         WHERE supplier = $1 \
         ORDER BY sku ASC \
         LIMIT $2"
    ))
    .bind(supplier)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(StoredDetail::try_from).collect()
}

/// Lists up to `limit` detail rows with no storefront id yet, ordered by SKU.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// for a row with a blank SKU.
pub async fn list_pending_details(
    pool: &PgPool,
    supplier: &str,
    limit: i64,
) -> Result<Vec<StoredDetail>, DbError> {
    let rows = sqlx::query_as::<_, SupplierProductRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM supplier_products \
         WHERE supplier = $1 AND shopify_product_id IS NULL \
         ORDER BY sku ASC \
         LIMIT $2"
    ))
    .bind(supplier)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(StoredDetail::try_from).collect()
}

/// All detail SKUs for `supplier`, ordered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_detail_skus(pool: &PgPool, supplier: &str) -> Result<Vec<NormalizedSku>, DbError> {
    let skus = sqlx::query_scalar::<_, String>(
        "SELECT sku FROM supplier_products WHERE supplier = $1 ORDER BY sku ASC",
    )
    .bind(supplier)
    .fetch_all(pool)
    .await?;

    Ok(skus.iter().filter_map(|s| NormalizedSku::new(s)).collect())
}

/// Records the storefront ids for a published SKU and stamps `synced_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no detail row exists for the SKU, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_external_ids(
    pool: &PgPool,
    supplier: &str,
    sku: &NormalizedSku,
    ids: &ExternalIds,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE supplier_products SET \
             shopify_product_id = $3, \
             shopify_variant_id = $4, \
             synced_at          = NOW(), \
             updated_at         = NOW() \
         WHERE supplier = $1 AND sku = $2",
    )
    .bind(supplier)
    .bind(sku.as_str())
    .bind(&ids.product_id)
    .bind(&ids.variant_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
