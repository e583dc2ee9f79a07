//! Keyword classification of supplier products into storefront tags and a
//! coarse product type, used to drive automated collections.

/// One row of the keyword table.
struct Rule {
    tags: &'static [&'static str],
    product_type: &'static str,
    name_keywords: &'static [&'static str],
    range_keywords: &'static [&'static str],
}

/// Ordered: the first matching rule provides the product type, every
/// matching rule contributes its tags.
const RULES: &[Rule] = &[
    Rule {
        tags: &["sofa"],
        product_type: "Sofas",
        name_keywords: &["sofa", "settee"],
        range_keywords: &["sofa"],
    },
    Rule {
        tags: &["bed"],
        product_type: "Beds",
        name_keywords: &["bed", "bedroom"],
        range_keywords: &["bed"],
    },
    Rule {
        tags: &["mattress"],
        product_type: "Mattresses",
        name_keywords: &["mattress"],
        range_keywords: &[],
    },
    Rule {
        tags: &["wardrobe"],
        product_type: "Wardrobes",
        name_keywords: &["wardrobe", "closet", "storage"],
        range_keywords: &[],
    },
    Rule {
        tags: &["dining"],
        product_type: "Dining",
        name_keywords: &["dining", "table", "chair"],
        range_keywords: &["dining"],
    },
    Rule {
        tags: &["package"],
        product_type: "Packages",
        name_keywords: &["package", "bundle", "deal"],
        range_keywords: &[],
    },
    Rule {
        tags: &["landlord", "rental"],
        product_type: "Landlord Packs",
        name_keywords: &["landlord", "rental", "furnished", "crib5"],
        range_keywords: &[],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Supplier id first, then rule tags in table order.
    pub tags: Vec<String>,
    pub product_type: Option<&'static str>,
}

/// Matches `name` and `range` case-insensitively against the keyword table.
#[must_use]
pub fn classify_product(supplier: &str, name: Option<&str>, range: Option<&str>) -> Classification {
    let name = name.unwrap_or_default().to_lowercase();
    let range = range.unwrap_or_default().to_lowercase();

    let mut tags = vec![supplier.to_string()];
    let mut product_type = None;

    for rule in RULES {
        let matched = rule.name_keywords.iter().any(|k| name.contains(k))
            || rule.range_keywords.iter().any(|k| range.contains(k));
        if !matched {
            continue;
        }
        tags.extend(rule.tags.iter().map(|t| (*t).to_string()));
        product_type.get_or_insert(rule.product_type);
    }

    Classification { tags, product_type }
}
