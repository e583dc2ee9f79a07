pub mod app_config;
pub mod classify;
pub mod config;
pub mod pricing;
pub mod products;
pub mod sku;

pub use app_config::{AppConfig, Environment, ShopifyCredentials};
pub use classify::{classify_product, Classification};
pub use config::{load_app_config, load_app_config_from_env};
pub use pricing::{compute_sell_price, round2, round_up_to_nearest, PricingRules, SellPrice};
pub use products::{
    category_key, AssembledDimensions, ComplianceLinks, ExternalIds, PackagingBox, PriceRow,
    ProductDetail, StoredDetail, CATEGORY_COUNT, MAX_BOXES, MAX_IMAGES,
};
pub use sku::{expand_scientific_notation, normalize_sku, NormalizedSku};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
