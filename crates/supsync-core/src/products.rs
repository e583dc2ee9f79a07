use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sku::NormalizedSku;

/// Number of repeated "Box N" column groups in the details feed.
pub const MAX_BOXES: u8 = 10;
/// Number of repeated "Image N" URL columns in the details feed.
pub const MAX_IMAGES: u8 = 20;
/// Number of boolean category columns (`C1`..`C19`) in the details feed.
pub const CATEGORY_COUNT: u8 = 19;

/// Map key for category flag `n`, e.g. `category_key(3) == "C3"`.
#[must_use]
pub fn category_key(n: u8) -> String {
    format!("C{n}")
}

/// Supplier product attributes, one per `(supplier, sku)`.
///
/// Produced by the details parser and stored wholesale: a re-import replaces
/// every field for the SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub supplier: String,
    pub sku: NormalizedSku,
    /// Supplier's own product identifier, distinct from the storefront id.
    pub product_id: Option<String>,
    pub ean: Option<String>,
    pub commodity_code: Option<String>,
    pub range: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub finish: Option<String>,
    pub assembled: AssembledDimensions,
    /// Ordered by `box_index`; indices with no data are absent.
    pub boxes: Vec<PackagingBox>,
    /// Source order, gaps skipped.
    pub images: Vec<String>,
    /// Sparse: only categories whose column exists in the feed appear.
    pub categories: BTreeMap<String, bool>,
    pub compliance: ComplianceLinks,
}

/// Assembled product dimensions (centimetres, kilograms).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledDimensions {
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub depth_cm: Option<f64>,
    pub weight_kg: Option<f64>,
}

/// One shipping carton of a multi-box product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingBox {
    /// 1-based position in the feed's "Box N" columns.
    pub box_index: u8,
    pub ean: Option<String>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub volume_m3: Option<f64>,
    pub weight_kg: Option<f64>,
}

impl PackagingBox {
    /// `true` when none of the six sub-fields carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ean.is_none()
            && self.length_cm.is_none()
            && self.width_cm.is_none()
            && self.height_cm.is_none()
            && self.volume_m3.is_none()
            && self.weight_kg.is_none()
    }
}

/// Fire-safety certificates published by the supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceLinks {
    pub fr_fabric_url: Option<String>,
    pub fr_foam_url: Option<String>,
}

/// Supplier cost/stock row, one per `(supplier, sku)`.
///
/// Every field except the key is optional: a cell that fails to parse is
/// stored as `None` rather than dropping the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub supplier: String,
    pub sku: NormalizedSku,
    pub cost_price: Option<Decimal>,
    /// Recommended retail price.
    pub rrp: Option<Decimal>,
    pub trade_price: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
    pub stock_qty: Option<f64>,
    pub availability_status: Option<String>,
    pub lead_time_days: Option<f64>,
    /// `None` means unknown, which is not the same as "still sold".
    pub discontinued: Option<bool>,
    /// Original `header -> cell` pairs, only when requested at parse time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<BTreeMap<String, String>>,
}

/// Identifiers of the storefront product created for a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    pub product_id: String,
    /// Default variant; `None` for rows published before variant ids were kept.
    pub variant_id: Option<String>,
}

/// A [`ProductDetail`] as held by the catalog store, together with the
/// storefront ids recorded by the sync stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDetail {
    pub detail: ProductDetail,
    pub external: Option<ExternalIds>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl StoredDetail {
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.external.is_some()
    }
}
