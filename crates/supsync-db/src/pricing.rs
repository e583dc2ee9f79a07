//! Database operations for `supplier_product_pricing`.

use rust_decimal::Decimal;
use sqlx::PgPool;
use supsync_core::{NormalizedSku, PriceRow};

use crate::DbError;

/// A row from the `supplier_product_pricing` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PricingRow {
    pub supplier: String,
    pub sku: String,
    pub cost_price: Option<Decimal>,
    pub rrp: Option<Decimal>,
    pub trade_price: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
    pub currency: String,
    pub stock_qty: Option<f64>,
    pub availability_status: Option<String>,
    pub lead_time_days: Option<f64>,
    pub discontinued: Option<bool>,
}

impl TryFrom<PricingRow> for PriceRow {
    type Error = DbError;

    fn try_from(row: PricingRow) -> Result<Self, Self::Error> {
        let sku = NormalizedSku::new(&row.sku).ok_or_else(|| DbError::InvalidRow {
            supplier: row.supplier.clone(),
            sku: row.sku.clone(),
            reason: "blank sku".to_string(),
        })?;

        Ok(PriceRow {
            supplier: row.supplier,
            sku,
            cost_price: row.cost_price,
            rrp: row.rrp,
            trade_price: row.trade_price,
            vat_rate: row.vat_rate,
            stock_qty: row.stock_qty,
            availability_status: row.availability_status,
            lead_time_days: row.lead_time_days,
            discontinued: row.discontinued,
            raw: None,
        })
    }
}

/// Inserts or wholly replaces the price row for `(supplier, sku)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_price(pool: &PgPool, row: &PriceRow, currency: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO supplier_product_pricing \
             (supplier, sku, cost_price, rrp, trade_price, vat_rate, currency, \
              stock_qty, availability_status, lead_time_days, discontinued) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (supplier, sku) DO UPDATE SET \
             cost_price          = EXCLUDED.cost_price, \
             rrp                 = EXCLUDED.rrp, \
             trade_price         = EXCLUDED.trade_price, \
             vat_rate            = EXCLUDED.vat_rate, \
             currency            = EXCLUDED.currency, \
             stock_qty           = EXCLUDED.stock_qty, \
             availability_status = EXCLUDED.availability_status, \
             lead_time_days      = EXCLUDED.lead_time_days, \
             discontinued        = EXCLUDED.discontinued, \
             updated_at          = NOW()",
    )
    .bind(&row.supplier)
    .bind(row.sku.as_str())
    .bind(row.cost_price)
    .bind(row.rrp)
    .bind(row.trade_price)
    .bind(row.vat_rate)
    .bind(currency)
    .bind(row.stock_qty)
    .bind(&row.availability_status)
    .bind(row.lead_time_days)
    .bind(row.discontinued)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the price row for `(supplier, sku)`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_price(
    pool: &PgPool,
    supplier: &str,
    sku: &NormalizedSku,
) -> Result<Option<PriceRow>, DbError> {
    let row = sqlx::query_as::<_, PricingRow>(
        "SELECT supplier, sku, cost_price, rrp, trade_price, vat_rate, currency, \
                stock_qty, availability_status, lead_time_days, discontinued \
         FROM supplier_product_pricing \
         WHERE supplier = $1 AND sku = $2",
    )
    .bind(supplier)
    .bind(sku.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(PriceRow::try_from).transpose()
}

/// All priced SKUs for `supplier`, ordered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_skus(pool: &PgPool, supplier: &str) -> Result<Vec<NormalizedSku>, DbError> {
    let skus = sqlx::query_scalar::<_, String>(
        "SELECT sku FROM supplier_product_pricing WHERE supplier = $1 ORDER BY sku ASC",
    )
    .bind(supplier)
    .fetch_all(pool)
    .await?;

    Ok(skus.iter().filter_map(|s| NormalizedSku::new(s)).collect())
}
