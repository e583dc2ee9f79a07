//! In-process [`CatalogStore`] with the same upsert and ordering semantics as
//! the Postgres store. Used by the pipeline tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use supsync_core::{ExternalIds, NormalizedSku, PriceRow, ProductDetail, StoredDetail};

use crate::{CatalogStore, DbError};

type Key = (String, NormalizedSku);

#[derive(Debug, Default)]
struct Tables {
    details: BTreeMap<Key, StoredDetail>,
    prices: BTreeMap<Key, (PriceRow, String)>,
    /// SKUs whose `set_external_ids` call is made to fail.
    #[cfg(any(test, feature = "test-util"))]
    failing_id_writes: std::collections::BTreeSet<Key>,
}

#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: Mutex<Tables>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every later `set_external_ids` for this SKU return
    /// [`DbError::InjectedFailure`].
    #[cfg(any(test, feature = "test-util"))]
    pub fn fail_external_id_writes(&self, supplier: &str, sku: &NormalizedSku) {
        self.lock()
            .failing_id_writes
            .insert((supplier.to_string(), sku.clone()));
    }

    /// Currency recorded with the stored price row, if any.
    #[must_use]
    pub fn price_currency(&self, supplier: &str, sku: &NormalizedSku) -> Option<String> {
        self.lock()
            .prices
            .get(&(supplier.to_string(), sku.clone()))
            .map(|(_, currency)| currency.clone())
    }

    #[must_use]
    pub fn detail_count(&self) -> usize {
        self.lock().details.len()
    }

    #[must_use]
    pub fn price_count(&self) -> usize {
        self.lock().prices.len()
    }
}

fn take_limit<T>(items: impl Iterator<Item = T>, limit: Option<i64>) -> Vec<T> {
    match limit.map(|l| usize::try_from(l).unwrap_or(0)) {
        Some(n) => items.take(n).collect(),
        None => items.collect(),
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn upsert_detail(&self, detail: &ProductDetail) -> Result<(), DbError> {
        let mut tables = self.lock();
        let key = (detail.supplier.clone(), detail.sku.clone());
        match tables.details.get_mut(&key) {
            Some(stored) => stored.detail = detail.clone(),
            None => {
                tables.details.insert(
                    key,
                    StoredDetail {
                        detail: detail.clone(),
                        external: None,
                        synced_at: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn upsert_price(&self, row: &PriceRow, currency: &str) -> Result<(), DbError> {
        let mut stored = row.clone();
        stored.raw = None;
        self.lock().prices.insert(
            (row.supplier.clone(), row.sku.clone()),
            (stored, currency.to_string()),
        );
        Ok(())
    }

    async fn list_details(
        &self,
        supplier: &str,
        limit: Option<i64>,
    ) -> Result<Vec<StoredDetail>, DbError> {
        let tables = self.lock();
        let rows = tables
            .details
            .iter()
            .filter(|((s, _), _)| s == supplier)
            .map(|(_, d)| d.clone());
        Ok(take_limit(rows, limit))
    }

    async fn list_pending_details(
        &self,
        supplier: &str,
        limit: i64,
    ) -> Result<Vec<StoredDetail>, DbError> {
        let tables = self.lock();
        let rows = tables
            .details
            .iter()
            .filter(|((s, _), d)| s == supplier && !d.is_synced())
            .map(|(_, d)| d.clone());
        Ok(take_limit(rows, Some(limit)))
    }

    async fn get_price(
        &self,
        supplier: &str,
        sku: &NormalizedSku,
    ) -> Result<Option<PriceRow>, DbError> {
        Ok(self
            .lock()
            .prices
            .get(&(supplier.to_string(), sku.clone()))
            .map(|(row, _)| row.clone()))
    }

    async fn list_detail_skus(&self, supplier: &str) -> Result<Vec<NormalizedSku>, DbError> {
        Ok(self
            .lock()
            .details
            .keys()
            .filter(|(s, _)| s == supplier)
            .map(|(_, sku)| sku.clone())
            .collect())
    }

    async fn list_price_skus(&self, supplier: &str) -> Result<Vec<NormalizedSku>, DbError> {
        Ok(self
            .lock()
            .prices
            .keys()
            .filter(|(s, _)| s == supplier)
            .map(|(_, sku)| sku.clone())
            .collect())
    }

    async fn set_external_ids(
        &self,
        supplier: &str,
        sku: &NormalizedSku,
        ids: &ExternalIds,
    ) -> Result<(), DbError> {
        let mut tables = self.lock();
        let key = (supplier.to_string(), sku.clone());
        #[cfg(any(test, feature = "test-util"))]
        if tables.failing_id_writes.contains(&key) {
            return Err(DbError::InjectedFailure {
                supplier: key.0,
                sku: key.1.as_str().to_string(),
            });
        }
        let stored = tables.details.get_mut(&key).ok_or(DbError::NotFound)?;
        stored.external = Some(ids.clone());
        stored.synced_at = Some(Utc::now());
        Ok(())
    }
}
