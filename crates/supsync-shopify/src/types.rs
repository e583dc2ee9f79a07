//! Serde shapes of the Admin GraphQL responses we read.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQLErrorMessage>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Messages of the user errors that carry one.
pub(crate) fn user_error_messages(errors: &[UserError]) -> Vec<String> {
    errors
        .iter()
        .filter_map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdNode {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductNode {
    pub id: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub variants: Option<Connection<IdNode>>,
}

impl ProductNode {
    pub fn first_variant_id(&self) -> Option<&str> {
        self.variants
            .as_ref()
            .and_then(|v| v.nodes.first())
            .map(|n| n.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductCreateData {
    pub product_create: Option<ProductCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductCreatePayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
    pub product: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductVariantUpdateData {
    pub product_variant_update: Option<UserErrorsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserErrorsPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsData {
    pub products: Connection<ProductNode>,
}
