//! Parser for the price/stock export: single header row at row 0, data from
//! row 1.

use std::collections::BTreeMap;
use std::path::Path;

use supsync_core::{NormalizedSku, PriceRow};

use crate::columns::{ColumnMap, FieldSpec};
use crate::error::{FeedError, FeedKind};
use crate::parsed::ParsedFeed;
use crate::reader::{cell_bool, cell_decimal, cell_num, cell_str, read_rows_from_path};

const HEADER_ROW: usize = 0;
const FIRST_DATA_ROW: usize = 1;

/// Number of raw SKU cells logged before parsing, to spot exporter damage.
const RAW_SKU_SAMPLE: usize = 5;

const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "sku",
        candidates: &["SKU", "Product Code", "Code", "Part No", "Part No.", "Item Code"],
    },
    FieldSpec {
        key: "cost_price",
        candidates: &["Cost", "Cost Price", "Cost Price (ex VAT)", "Cost (ex VAT)"],
    },
    FieldSpec {
        key: "trade_price",
        candidates: &["Trade", "Trade Price", "Trade Price (ex VAT)"],
    },
    FieldSpec {
        key: "rrp",
        candidates: &["RRP", "Selling Price", "Retail", "Retail Price", "Price"],
    },
    FieldSpec {
        key: "vat_rate",
        candidates: &["VAT", "VAT Rate", "VAT %"],
    },
    FieldSpec {
        key: "stock_qty",
        candidates: &["Stock", "Qty", "Quantity", "Qty In Stock", "Available"],
    },
    FieldSpec {
        key: "availability_status",
        candidates: &["Availability", "Status", "Stock Status", "Availability Status"],
    },
    FieldSpec {
        key: "lead_time_days",
        candidates: &["Lead Time", "Lead Time (days)", "Delivery Days", "Days"],
    },
    FieldSpec {
        key: "discontinued",
        candidates: &["Discontinued", "Deleted", "Status"],
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceParseOptions {
    /// Attach the original `header -> cell` map to every row.
    pub include_raw: bool,
}

/// Reads and parses a price feed file.
///
/// # Errors
///
/// See [`parse_price`]; additionally [`FeedError::Io`] / [`FeedError::Csv`]
/// when the file cannot be read.
pub fn parse_price_file(
    path: &Path,
    supplier: &str,
    options: PriceParseOptions,
) -> Result<ParsedFeed<PriceRow>, FeedError> {
    tracing::info!(path = %path.display(), "reading price feed");
    let rows = read_rows_from_path(path)?;
    parse_price(&rows, supplier, options)
}

/// Parses raw price-feed rows into one [`PriceRow`] per data row that carries
/// a SKU. Cells that fail to parse become `None`; the row is kept. Rows with
/// a blank SKU are counted as skipped.
///
/// # Errors
///
/// Returns [`FeedError::MissingHeader`] for an empty file and
/// [`FeedError::MissingSkuColumn`] when no header resolves to the SKU field.
pub fn parse_price(
    rows: &[Vec<String>],
    supplier: &str,
    options: PriceParseOptions,
) -> Result<ParsedFeed<PriceRow>, FeedError> {
    let Some(header) = rows.get(HEADER_ROW) else {
        return Err(FeedError::MissingHeader {
            feed: FeedKind::Price,
            rows: 0,
        });
    };

    let columns = ColumnMap::resolve(header, FIELDS, &[]);
    let Some(sku_col) = columns.get("sku") else {
        return Err(FeedError::MissingSkuColumn {
            feed: FeedKind::Price,
            header: header.clone(),
        });
    };

    let data = rows.get(FIRST_DATA_ROW..).unwrap_or_default();

    let samples: Vec<&str> = data
        .iter()
        .filter_map(|row| cell_str(row, Some(sku_col)))
        .take(RAW_SKU_SAMPLE)
        .collect();
    tracing::info!(?samples, "first raw SKUs in price feed");

    let mut parsed = Vec::with_capacity(data.len());
    let mut skipped = 0;
    for (i, row) in data.iter().enumerate() {
        let line = i + FIRST_DATA_ROW + 1;
        let Some((raw_sku, sku)) = cell_str(row, Some(sku_col))
            .and_then(|raw| NormalizedSku::from_raw(raw).map(|sku| (raw, sku)))
        else {
            skipped += 1;
            continue;
        };
        if sku.looks_corrupted() {
            tracing::warn!(row = line, raw = raw_sku, sku = %sku, "SKU still in scientific notation after expansion");
        }

        let availability_status =
            cell_str(row, columns.get("availability_status")).map(str::to_string);
        let discontinued = cell_bool(row, columns.get("discontinued")).or_else(|| {
            availability_status
                .as_deref()
                .map(|status| status.to_lowercase().contains("discontinued"))
        });

        let raw = options.include_raw.then(|| raw_cells(header, row));

        parsed.push(PriceRow {
            supplier: supplier.to_string(),
            sku,
            cost_price: cell_decimal(row, columns.get("cost_price")),
            rrp: cell_decimal(row, columns.get("rrp")),
            trade_price: cell_decimal(row, columns.get("trade_price")),
            vat_rate: cell_decimal(row, columns.get("vat_rate")),
            stock_qty: cell_num(row, columns.get("stock_qty")),
            availability_status,
            lead_time_days: cell_num(row, columns.get("lead_time_days")),
            discontinued,
            raw,
        });
    }

    tracing::info!(
        data_rows = data.len(),
        parsed = parsed.len(),
        skipped,
        "parsed price feed"
    );
    Ok(ParsedFeed {
        records: parsed,
        data_rows: data.len(),
        skipped,
    })
}

/// Non-empty cells keyed by their header text.
fn raw_cells(header: &[String], row: &[String]) -> BTreeMap<String, String> {
    header
        .iter()
        .zip(row)
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(h, cell)| (h.clone(), cell.clone()))
        .collect()
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
