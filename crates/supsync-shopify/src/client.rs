use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use supsync_core::{AppConfig, ShopifyCredentials};

use crate::api::{CatalogApi, CreatedProduct, NewProduct, VariantUpdate};
use crate::error::ShopifyError;
use crate::types::{
    user_error_messages, GraphQLResponse, ProductCreateData, ProductVariantUpdateData,
    ProductsData,
};

const USER_AGENT: &str = concat!("supsync/", env!("CARGO_PKG_VERSION"));

const PRODUCT_CREATE: &str = "mutation CreateProduct($product: ProductCreateInput!) {
  productCreate(product: $product) {
    userErrors { field message }
    product { id handle variants(first: 1) { nodes { id } } }
  }
}";

const PRODUCT_VARIANT_UPDATE: &str = "mutation UpdateVariant($input: ProductVariantInput!) {
  productVariantUpdate(input: $input) {
    userErrors { field message }
  }
}";

const PRODUCT_BY_HANDLE: &str = "query ProductByHandle($query: String!) {
  products(first: 1, query: $query) {
    nodes { id handle variants(first: 1) { nodes { id } } }
  }
}";

/// Shopify Admin GraphQL client authenticated with a static access token.
///
/// Every call is a single POST bounded by the configured request timeout.
/// HTTP 429 and other non-2xx statuses, top-level GraphQL `errors`, and
/// mutation `userErrors` all surface as [`ShopifyError`]s. No retries are
/// attempted here; the sync driver records the failure and moves on.
pub struct ShopifyAdminClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl std::fmt::Debug for ShopifyAdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminClient")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

/// `https://<domain>` for a configured store domain, which may already
/// carry a scheme or a trailing slash.
pub(crate) fn store_base_url(store_domain: &str) -> String {
    let domain = store_domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{domain}")
}

pub(crate) fn graphql_endpoint(base_url: &str, api_version: &str) -> String {
    format!(
        "{}/admin/api/{api_version}/graphql.json",
        base_url.trim_end_matches('/')
    )
}

/// Variables for `productCreate`. Empty tags and a missing product type are
/// left out of the input rather than sent as empty values.
pub(crate) fn product_create_variables(product: &NewProduct) -> Value {
    let mut input = json!({
        "title": product.title,
        "descriptionHtml": product.description_html,
        "vendor": product.vendor,
        "status": product.status.as_str(),
        "handle": product.handle,
    });
    if !product.tags.is_empty() {
        input["tags"] = json!(product.tags);
    }
    if let Some(product_type) = &product.product_type {
        input["productType"] = json!(product_type);
    }
    json!({ "product": input })
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Variables for `productVariantUpdate`. Prices are sent as two-decimal
/// strings; a missing compare-at price is sent as `null` to clear it.
pub(crate) fn variant_update_variables(update: &VariantUpdate) -> Value {
    json!({
        "input": {
            "id": update.variant_id,
            "price": money(update.price),
            "compareAtPrice": update.compare_at_price.map(money),
            "sku": update.sku,
        }
    })
}

impl ShopifyAdminClient {
    /// Creates a client for the store in `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(credentials: &ShopifyCredentials, timeout_secs: u64) -> Result<Self, ShopifyError> {
        Self::with_base_url(
            &store_base_url(&credentials.store_domain),
            credentials,
            timeout_secs,
        )
    }

    /// Creates a client that talks to `base_url` instead of the store domain.
    /// Tests point this at a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        credentials: &ShopifyCredentials,
        timeout_secs: u64,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: graphql_endpoint(base_url, &credentials.api_version),
            access_token: credentials.access_token.clone(),
        })
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::MissingCredentials`] if no store domain and
    /// token are configured, or [`ShopifyError::Http`] if the client cannot be
    /// built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ShopifyError> {
        let credentials = config
            .shopify
            .as_ref()
            .ok_or(ShopifyError::MissingCredentials)?;
        Self::new(credentials, config.shopify_request_timeout_secs)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ShopifyError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(ShopifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<GraphQLResponse<T>>(&body).map_err(|e| {
            ShopifyError::Deserialize {
                context: format!("{operation} response"),
                source: e,
            }
        })?;

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        parsed.data.ok_or(ShopifyError::MissingField {
            operation,
            field: "data",
        })
    }
}

#[async_trait]
impl CatalogApi for ShopifyAdminClient {
    async fn find_product_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<CreatedProduct>, ShopifyError> {
        let data: ProductsData = self
            .execute(
                "products",
                PRODUCT_BY_HANDLE,
                json!({ "query": format!("handle:{handle}") }),
            )
            .await?;

        // The search syntax is fuzzy; only an exact handle counts.
        let Some(node) = data
            .products
            .nodes
            .into_iter()
            .find(|n| n.handle.as_deref() == Some(handle))
        else {
            return Ok(None);
        };

        let variant_id = node
            .first_variant_id()
            .ok_or(ShopifyError::MissingField {
                operation: "products",
                field: "variants.nodes[0].id",
            })?
            .to_string();
        Ok(Some(CreatedProduct {
            product_id: node.id,
            variant_id,
        }))
    }

    async fn create_product(&self, product: &NewProduct) -> Result<CreatedProduct, ShopifyError> {
        let data: ProductCreateData = self
            .execute(
                "productCreate",
                PRODUCT_CREATE,
                product_create_variables(product),
            )
            .await?;

        let payload = data.product_create.ok_or(ShopifyError::MissingField {
            operation: "productCreate",
            field: "productCreate",
        })?;

        let messages = user_error_messages(&payload.user_errors);
        if !messages.is_empty() {
            return Err(ShopifyError::UserErrors(messages));
        }

        let node = payload.product.ok_or(ShopifyError::MissingField {
            operation: "productCreate",
            field: "product",
        })?;
        let variant_id = node
            .first_variant_id()
            .ok_or(ShopifyError::MissingField {
                operation: "productCreate",
                field: "product.variants.nodes[0].id",
            })?
            .to_string();

        tracing::debug!(handle = %product.handle, product_id = %node.id, "product created");
        Ok(CreatedProduct {
            product_id: node.id,
            variant_id,
        })
    }

    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), ShopifyError> {
        let data: ProductVariantUpdateData = self
            .execute(
                "productVariantUpdate",
                PRODUCT_VARIANT_UPDATE,
                variant_update_variables(update),
            )
            .await?;

        let payload = data
            .product_variant_update
            .ok_or(ShopifyError::MissingField {
                operation: "productVariantUpdate",
                field: "productVariantUpdate",
            })?;

        let messages = user_error_messages(&payload.user_errors);
        if !messages.is_empty() {
            return Err(ShopifyError::UserErrors(messages));
        }

        tracing::debug!(
            product_id = %update.product_id,
            variant_id = %update.variant_id,
            price = %update.price,
            "variant updated"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
