use super::*;
use crate::api::ProductStatus;

fn new_product() -> NewProduct {
    NewProduct {
        title: "Oslo Sofa".to_string(),
        description_html: "<p>Furniture from FTG.</p>".to_string(),
        vendor: "FTG".to_string(),
        status: ProductStatus::Active,
        handle: "ftg001-ftg001".to_string(),
        tags: vec!["FTG".to_string(), "sofa".to_string()],
        product_type: Some("Sofas".to_string()),
    }
}

#[test]
fn store_base_url_accepts_bare_and_schemed_domains() {
    assert_eq!(
        store_base_url("shop.myshopify.com"),
        "https://shop.myshopify.com"
    );
    assert_eq!(
        store_base_url("https://shop.myshopify.com/"),
        "https://shop.myshopify.com"
    );
}

#[test]
fn graphql_endpoint_includes_api_version() {
    assert_eq!(
        graphql_endpoint("https://shop.myshopify.com/", "2024-01"),
        "https://shop.myshopify.com/admin/api/2024-01/graphql.json"
    );
}

#[test]
fn product_create_variables_carry_all_fields() {
    let vars = product_create_variables(&new_product());
    let input = &vars["product"];
    assert_eq!(input["title"], "Oslo Sofa");
    assert_eq!(input["status"], "ACTIVE");
    assert_eq!(input["handle"], "ftg001-ftg001");
    assert_eq!(input["tags"], json!(["FTG", "sofa"]));
    assert_eq!(input["productType"], "Sofas");
}

#[test]
fn product_create_variables_omit_empty_tags_and_type() {
    let mut product = new_product();
    product.tags.clear();
    product.product_type = None;
    let vars = product_create_variables(&product);
    assert!(vars["product"].get("tags").is_none());
    assert!(vars["product"].get("productType").is_none());
}

#[test]
fn variant_update_variables_format_money_with_two_decimals() {
    let update = VariantUpdate {
        variant_id: "gid://shopify/ProductVariant/1".to_string(),
        product_id: "gid://shopify/Product/1".to_string(),
        price: Decimal::new(145, 0),
        compare_at_price: Some(Decimal::new(2000, 1)),
        sku: "FTG001".to_string(),
    };
    let vars = variant_update_variables(&update);
    assert_eq!(vars["input"]["price"], "145.00");
    assert_eq!(vars["input"]["compareAtPrice"], "200.00");
    assert_eq!(vars["input"]["sku"], "FTG001");

    let cleared = VariantUpdate {
        compare_at_price: None,
        ..update
    };
    assert!(variant_update_variables(&cleared)["input"]["compareAtPrice"].is_null());
}

#[test]
fn debug_redacts_access_token() {
    let credentials = ShopifyCredentials {
        store_domain: "shop.myshopify.com".to_string(),
        access_token: "shpat_secret".to_string(),
        api_version: "2024-01".to_string(),
    };
    let client = ShopifyAdminClient::new(&credentials, 5).unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("shpat_secret"));
    assert!(debug.contains("[redacted]"));
}
