//! Parser for the product-attributes export.
//!
//! The file has a two-row header: row 0 carries grouping labels and is
//! ignored, row 1 carries the field names, and data starts at row 2.

use std::collections::BTreeMap;
use std::path::Path;

use supsync_core::{
    category_key, AssembledDimensions, ComplianceLinks, NormalizedSku, PackagingBox,
    ProductDetail, CATEGORY_COUNT, MAX_BOXES, MAX_IMAGES,
};

use crate::columns::{ColumnMap, FieldSpec, RepeatGroup};
use crate::error::{FeedError, FeedKind};
use crate::parsed::ParsedFeed;
use crate::reader::{cell_num, cell_str, parse_flag, read_rows_from_path};

const HEADER_ROW: usize = 1;
const FIRST_DATA_ROW: usize = 2;

const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "sku",
        candidates: &["SKU", "Product Code", "Code"],
    },
    FieldSpec {
        key: "product_id",
        candidates: &["Product ID", "ProductId", "ID"],
    },
    FieldSpec {
        key: "ean",
        candidates: &["EAN", "Barcode"],
    },
    FieldSpec {
        key: "commodity_code",
        candidates: &["Commodity Code", "CommodityCode", "Commodity"],
    },
    FieldSpec {
        key: "range",
        candidates: &["Range"],
    },
    FieldSpec {
        key: "name",
        candidates: &["Name", "Product Name", "Title"],
    },
    FieldSpec {
        key: "description",
        candidates: &["Description"],
    },
    FieldSpec {
        key: "finish",
        candidates: &["Finish"],
    },
    FieldSpec {
        key: "assembled_width",
        candidates: &["Assembled Width", "Width (cm)", "Width(cm)", "Width"],
    },
    FieldSpec {
        key: "assembled_height",
        candidates: &["Assembled Height", "Height (cm)", "Height(cm)", "Height"],
    },
    FieldSpec {
        key: "assembled_depth",
        candidates: &["Assembled Depth", "Depth (cm)", "Depth(cm)", "Depth"],
    },
    FieldSpec {
        key: "assembled_weight",
        candidates: &["Assembled Weight", "Weight (kg)", "Weight(kg)", "Weight"],
    },
    FieldSpec {
        key: "fr_fabric_url",
        candidates: &["FR Fabric URL", "Fabric URL", "FabricUrl"],
    },
    FieldSpec {
        key: "fr_foam_url",
        candidates: &["FR Foam URL", "Foam URL", "FoamUrl"],
    },
];

const BOX_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "box{n}_ean",
        candidates: &["Box {n} EAN", "Box{n} EAN", "Box {n}EAN"],
    },
    FieldSpec {
        key: "box{n}_length",
        candidates: &[
            "Box {n} Length",
            "Box {n} L",
            "Box{n}Length",
            "Box {n} Length (cm)",
        ],
    },
    FieldSpec {
        key: "box{n}_width",
        candidates: &[
            "Box {n} Width",
            "Box {n} W",
            "Box{n}Width",
            "Box {n} Width (cm)",
        ],
    },
    FieldSpec {
        key: "box{n}_height",
        candidates: &[
            "Box {n} Height",
            "Box {n} H",
            "Box{n}Height",
            "Box {n} Height (cm)",
        ],
    },
    FieldSpec {
        key: "box{n}_m3",
        candidates: &["Box {n} m3", "Box {n} M3", "Box{n}m3"],
    },
    FieldSpec {
        key: "box{n}_weight",
        candidates: &["Box {n} Weight", "Box {n} Weight (kg)", "Box{n}Weight"],
    },
];

const IMAGE_FIELDS: &[FieldSpec] = &[FieldSpec {
    key: "image{n}",
    candidates: &["Image {n}", "Image{n}", "Image {n} URL"],
}];

const CATEGORY_FIELDS: &[FieldSpec] = &[FieldSpec {
    key: "c{n}",
    candidates: &["C{n}", "Category {n}", "Category{n}"],
}];

const GROUPS: &[RepeatGroup] = &[
    RepeatGroup {
        count: MAX_BOXES,
        fields: BOX_FIELDS,
    },
    RepeatGroup {
        count: MAX_IMAGES,
        fields: IMAGE_FIELDS,
    },
    RepeatGroup {
        count: CATEGORY_COUNT,
        fields: CATEGORY_FIELDS,
    },
];

/// Reads and parses a details feed file.
///
/// # Errors
///
/// See [`parse_details`]; additionally [`FeedError::Io`] / [`FeedError::Csv`]
/// when the file cannot be read.
pub fn parse_details_file(
    path: &Path,
    supplier: &str,
) -> Result<ParsedFeed<ProductDetail>, FeedError> {
    tracing::info!(path = %path.display(), "reading details feed");
    let rows = read_rows_from_path(path)?;
    parse_details(&rows, supplier)
}

/// Parses raw details-feed rows into one [`ProductDetail`] per data row that
/// carries a SKU. Rows with a blank SKU are counted as skipped.
///
/// # Errors
///
/// Returns [`FeedError::MissingHeader`] when there are fewer than two rows and
/// [`FeedError::MissingSkuColumn`] when no header resolves to the SKU field.
/// Every other column is optional.
pub fn parse_details(
    rows: &[Vec<String>],
    supplier: &str,
) -> Result<ParsedFeed<ProductDetail>, FeedError> {
    if rows.len() < FIRST_DATA_ROW {
        return Err(FeedError::MissingHeader {
            feed: FeedKind::Details,
            rows: rows.len(),
        });
    }

    let header = &rows[HEADER_ROW];
    let columns = ColumnMap::resolve(header, FIELDS, GROUPS);
    if columns.get("sku").is_none() {
        return Err(FeedError::MissingSkuColumn {
            feed: FeedKind::Details,
            header: header.clone(),
        });
    }
    tracing::debug!(resolved = columns.len(), "details columns resolved");

    let data = &rows[FIRST_DATA_ROW..];
    let details: Vec<ProductDetail> = data
        .iter()
        .enumerate()
        .filter_map(|(i, row)| parse_row(row, &columns, supplier, i + FIRST_DATA_ROW + 1))
        .collect();
    let skipped = data.len() - details.len();

    tracing::info!(
        data_rows = data.len(),
        parsed = details.len(),
        skipped,
        "parsed details feed"
    );
    Ok(ParsedFeed {
        records: details,
        data_rows: data.len(),
        skipped,
    })
}

/// `line` is the 1-based row number in the file, for diagnostics.
fn parse_row(
    row: &[String],
    columns: &ColumnMap,
    supplier: &str,
    line: usize,
) -> Option<ProductDetail> {
    let raw_sku = cell_str(row, columns.get("sku"))?;
    let sku = NormalizedSku::from_raw(raw_sku)?;
    if sku.looks_corrupted() {
        tracing::warn!(row = line, raw = raw_sku, sku = %sku, "SKU still in scientific notation after expansion");
    }

    let text = |key: &str| cell_str(row, columns.get(key)).map(str::to_string);
    let number = |key: &str| cell_num(row, columns.get(key));

    let assembled = AssembledDimensions {
        width_cm: number("assembled_width"),
        height_cm: number("assembled_height"),
        depth_cm: number("assembled_depth"),
        weight_kg: number("assembled_weight"),
    };

    let boxes = (1..=MAX_BOXES)
        .map(|n| PackagingBox {
            box_index: n,
            ean: cell_str(row, columns.indexed("box{n}_ean", n)).map(str::to_string),
            length_cm: cell_num(row, columns.indexed("box{n}_length", n)),
            width_cm: cell_num(row, columns.indexed("box{n}_width", n)),
            height_cm: cell_num(row, columns.indexed("box{n}_height", n)),
            volume_m3: cell_num(row, columns.indexed("box{n}_m3", n)),
            weight_kg: cell_num(row, columns.indexed("box{n}_weight", n)),
        })
        .filter(|b| !b.is_empty())
        .collect();

    let images = (1..=MAX_IMAGES)
        .filter_map(|n| cell_str(row, columns.indexed("image{n}", n)))
        .map(str::to_string)
        .collect();

    let mut categories = BTreeMap::new();
    for n in 1..=CATEGORY_COUNT {
        if let Some(index) = columns.indexed("c{n}", n) {
            categories.insert(category_key(n), category_flag(cell_str(row, Some(index))));
        }
    }

    Some(ProductDetail {
        supplier: supplier.to_string(),
        sku,
        product_id: text("product_id"),
        ean: text("ean"),
        commodity_code: text("commodity_code"),
        range: text("range"),
        name: text("name"),
        description: text("description"),
        finish: text("finish"),
        assembled,
        boxes,
        images,
        categories,
        compliance: ComplianceLinks {
            fr_fabric_url: text("fr_fabric_url"),
            fr_foam_url: text("fr_foam_url"),
        },
    })
}

/// Category cells use the boolean vocabulary; an empty cell is `false` and
/// any other non-empty marker (e.g. `X`) is `true`.
fn category_flag(cell: Option<&str>) -> bool {
    cell.is_some_and(|v| parse_flag(v).unwrap_or(true))
}

#[cfg(test)]
#[path = "details_test.rs"]
mod tests;
