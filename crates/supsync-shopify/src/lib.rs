//! Shopify Admin GraphQL client for publishing supplier products.

pub mod api;
pub mod client;
pub mod error;
mod types;

pub use api::{CatalogApi, CreatedProduct, NewProduct, ProductStatus, VariantUpdate};
pub use client::ShopifyAdminClient;
pub use error::ShopifyError;
