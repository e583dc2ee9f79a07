//! The catalog store seam used by the pipeline.

use async_trait::async_trait;
use sqlx::PgPool;
use supsync_core::{ExternalIds, NormalizedSku, PriceRow, ProductDetail, StoredDetail};

use crate::DbError;

/// Persistence for supplier details, prices, and storefront ids.
///
/// [`PgCatalogStore`] is the production implementation;
/// [`MemoryCatalogStore`](crate::MemoryCatalogStore) backs pipeline tests.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert_detail(&self, detail: &ProductDetail) -> Result<(), DbError>;

    async fn upsert_price(&self, row: &PriceRow, currency: &str) -> Result<(), DbError>;

    /// Details ordered by SKU; `None` returns all of them.
    async fn list_details(
        &self,
        supplier: &str,
        limit: Option<i64>,
    ) -> Result<Vec<StoredDetail>, DbError>;

    /// Details with no storefront id, ordered by SKU.
    async fn list_pending_details(
        &self,
        supplier: &str,
        limit: i64,
    ) -> Result<Vec<StoredDetail>, DbError>;

    async fn get_price(
        &self,
        supplier: &str,
        sku: &NormalizedSku,
    ) -> Result<Option<PriceRow>, DbError>;

    async fn list_detail_skus(&self, supplier: &str) -> Result<Vec<NormalizedSku>, DbError>;

    async fn list_price_skus(&self, supplier: &str) -> Result<Vec<NormalizedSku>, DbError>;

    async fn set_external_ids(
        &self,
        supplier: &str,
        sku: &NormalizedSku,
        ids: &ExternalIds,
    ) -> Result<(), DbError>;
}

/// [`CatalogStore`] over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn upsert_detail(&self, detail: &ProductDetail) -> Result<(), DbError> {
        crate::supplier_products::upsert_detail(&self.pool, detail).await
    }

    async fn upsert_price(&self, row: &PriceRow, currency: &str) -> Result<(), DbError> {
        crate::pricing::upsert_price(&self.pool, row, currency).await
    }

    async fn list_details(
        &self,
        supplier: &str,
        limit: Option<i64>,
    ) -> Result<Vec<StoredDetail>, DbError> {
        crate::supplier_products::list_details(&self.pool, supplier, limit).await
    }

    async fn list_pending_details(
        &self,
        supplier: &str,
        limit: i64,
    ) -> Result<Vec<StoredDetail>, DbError> {
        crate::supplier_products::list_pending_details(&self.pool, supplier, limit).await
    }

    async fn get_price(
        &self,
        supplier: &str,
        sku: &NormalizedSku,
    ) -> Result<Option<PriceRow>, DbError> {
        crate::pricing::get_price(&self.pool, supplier, sku).await
    }

    async fn list_detail_skus(&self, supplier: &str) -> Result<Vec<NormalizedSku>, DbError> {
        crate::supplier_products::list_detail_skus(&self.pool, supplier).await
    }

    async fn list_price_skus(&self, supplier: &str) -> Result<Vec<NormalizedSku>, DbError> {
        crate::pricing::list_price_skus(&self.pool, supplier).await
    }

    async fn set_external_ids(
        &self,
        supplier: &str,
        sku: &NormalizedSku,
        ids: &ExternalIds,
    ) -> Result<(), DbError> {
        crate::supplier_products::set_external_ids(&self.pool, supplier, sku, ids).await
    }
}
