use std::path::PathBuf;

use crate::pricing::PricingRules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Admin API credentials for the storefront.
#[derive(Clone)]
pub struct ShopifyCredentials {
    pub store_domain: String,
    pub access_token: String,
    pub api_version: String,
}

impl std::fmt::Debug for ShopifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyCredentials")
            .field("store_domain", &self.store_domain)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Optional at load time; store-backed commands require it.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub supplier: String,
    pub currency: String,
    pub feed_dir: PathBuf,
    pub details_csv_path: Option<PathBuf>,
    pub price_csv_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// `None` unless both domain and token are set.
    pub shopify: Option<ShopifyCredentials>,
    pub shopify_request_timeout_secs: u64,
    pub sync_inter_call_delay_ms: u64,
    pub sync_batch_limit: i64,
    pub pricing: PricingRules,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("supplier", &self.supplier)
            .field("currency", &self.currency)
            .field("feed_dir", &self.feed_dir)
            .field("details_csv_path", &self.details_csv_path)
            .field("price_csv_path", &self.price_csv_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("shopify", &self.shopify)
            .field(
                "shopify_request_timeout_secs",
                &self.shopify_request_timeout_secs,
            )
            .field("sync_inter_call_delay_ms", &self.sync_inter_call_delay_ms)
            .field("sync_batch_limit", &self.sync_batch_limit)
            .field("pricing", &self.pricing)
            .finish()
    }
}
