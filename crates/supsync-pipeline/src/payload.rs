//! Storefront product payload derived from a supplier detail row.

use supsync_core::{classify_product, ProductDetail};
use supsync_shopify::{NewProduct, ProductStatus};

/// Storefront title length limit.
pub const MAX_TITLE_CHARS: usize = 255;

const HANDLE_SUFFIX_LEN: usize = 6;

/// Lowercases, maps every run of characters outside `[a-z0-9]` to a single
/// `-`, and trims leading/trailing hyphens. An empty result becomes
/// `"product"`.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "product".to_string()
    } else {
        slug
    }
}

/// Deterministic handle for a SKU: the slug followed by its last six
/// characters. Used both to create products and to find orphans left by an
/// interrupted run.
#[must_use]
pub fn product_handle(sku: &str) -> String {
    let slug = slugify(sku);
    // slugify only emits ASCII, so byte slicing is char-safe.
    let tail = &slug[slug.len().saturating_sub(HANDLE_SUFFIX_LEN)..];
    format!("{slug}-{tail}")
}

#[must_use]
pub fn product_title(detail: &ProductDetail) -> String {
    let title = detail
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(detail.sku.as_str());
    title.chars().take(MAX_TITLE_CHARS).collect()
}

#[must_use]
pub fn description_html(detail: &ProductDetail) -> String {
    match detail.description.as_deref().filter(|d| !d.is_empty()) {
        Some(description) => description.replace('\n', "<br>"),
        None => format!("<p>Furniture from {}.</p>", detail.supplier),
    }
}

/// Builds the create-product payload: vendor is the supplier, status is
/// active, and tags/type come from the classification table.
#[must_use]
pub fn build_new_product(detail: &ProductDetail) -> NewProduct {
    let classification = classify_product(
        &detail.supplier,
        detail.name.as_deref(),
        detail.range.as_deref(),
    );
    NewProduct {
        title: product_title(detail),
        description_html: description_html(detail),
        vendor: detail.supplier.clone(),
        status: ProductStatus::Active,
        handle: product_handle(detail.sku.as_str()),
        tags: classification.tags,
        product_type: classification.product_type.map(str::to_string),
    }
}
