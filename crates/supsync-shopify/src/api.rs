//! The external catalog seam used by the sync driver.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ShopifyError;

/// Created products go live immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
}

impl ProductStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
        }
    }
}

/// Fields sent when creating a storefront product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub description_html: String,
    pub vendor: String,
    pub status: ProductStatus,
    pub handle: String,
    /// Sent only when non-empty.
    pub tags: Vec<String>,
    pub product_type: Option<String>,
}

/// A storefront product and its default variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProduct {
    pub product_id: String,
    pub variant_id: String,
}

/// Price and SKU for an existing variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantUpdate {
    pub variant_id: String,
    pub product_id: String,
    pub price: Decimal,
    /// `None` clears any strikethrough price.
    pub compare_at_price: Option<Decimal>,
    pub sku: String,
}

/// Product operations the pipeline needs from the storefront.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Looks up a product by its exact handle.
    async fn find_product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<CreatedProduct>, ShopifyError>;

    async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, ShopifyError>;

    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), ShopifyError>;
}
