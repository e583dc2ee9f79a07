use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::app_config::{AppConfig, Environment, ShopifyCredentials};
use crate::pricing::PricingRules;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Does not read `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parse and validate configuration from an env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let parse = |var: &str, default: &str| -> Result<Decimal, ConfigError> {
        parse_value::<Decimal>(var, &or_default(var, default))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value::<u32>(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("SUPSYNC_ENV", "development"));
    let log_level = or_default("SUPSYNC_LOG_LEVEL", "info");

    let supplier = or_default("SUPSYNC_SUPPLIER", "FTG");
    let currency = or_default("SUPSYNC_CURRENCY", "GBP");
    let feed_dir = PathBuf::from(or_default("SUPSYNC_FEED_DIR", "."));
    let details_csv_path = optional("SUPSYNC_DETAILS_CSV_PATH").map(PathBuf::from);
    let price_csv_path = optional("SUPSYNC_PRICE_CSV_PATH").map(PathBuf::from);

    let db_max_connections = parse_u32("SUPSYNC_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SUPSYNC_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SUPSYNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let shopify = match (
        optional("SHOPIFY_STORE_DOMAIN"),
        optional("SHOPIFY_ADMIN_ACCESS_TOKEN"),
    ) {
        (Some(store_domain), Some(access_token)) => Some(ShopifyCredentials {
            store_domain,
            access_token,
            api_version: or_default("SHOPIFY_API_VERSION", "2024-01"),
        }),
        _ => None,
    };
    let shopify_request_timeout_secs = parse_u64("SUPSYNC_SHOPIFY_REQUEST_TIMEOUT_SECS", "30")?;

    let sync_inter_call_delay_ms = parse_u64("SUPSYNC_SYNC_INTER_CALL_DELAY_MS", "400")?;
    let sync_batch_limit = parse_value::<i64>(
        "SUPSYNC_SYNC_BATCH_LIMIT",
        &or_default("SUPSYNC_SYNC_BATCH_LIMIT", "50"),
    )?;
    if sync_batch_limit <= 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SUPSYNC_SYNC_BATCH_LIMIT".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let pricing = PricingRules {
        margin_with_rrp: parse("SUPSYNC_MARGIN_WITH_RRP", "1.45")?,
        margin_no_rrp: parse("SUPSYNC_MARGIN_NO_RRP", "1.55")?,
        round_step: parse("SUPSYNC_ROUND_STEP", "1")?,
    };

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        supplier,
        currency,
        feed_dir,
        details_csv_path,
        price_csv_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        shopify,
        shopify_request_timeout_secs,
        sync_inter_call_delay_ms,
        sync_batch_limit,
        pricing,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
