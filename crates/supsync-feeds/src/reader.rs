//! Generic CSV ingestion and header-tolerant column lookup shared by both
//! feed parsers.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::FeedError;

/// Leading numeric token, the way spreadsheet tools read `"20%"` as 20.
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid numeric regex")
});

/// Reads a CSV file into raw rows of trimmed cells.
///
/// # Errors
///
/// Returns [`FeedError::Io`] if the file cannot be read, or [`FeedError::Csv`]
/// for an unrecoverable CSV syntax error.
pub fn read_rows_from_path(path: &Path) -> Result<Vec<Vec<String>>, FeedError> {
    let bytes = std::fs::read(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Exports are not always UTF-8 (Windows-1252 `£`); keep the row rather
    // than failing the whole file.
    read_rows(&String::from_utf8_lossy(&bytes))
}

/// Parses CSV text into raw rows.
///
/// Rows may have any number of cells. Blank lines are skipped and a leading
/// byte-order mark is removed. No header handling happens here: callers pick
/// their header row by index.
///
/// # Errors
///
/// Returns [`FeedError::Csv`] for an unrecoverable CSV syntax error.
pub fn read_rows(content: &str) -> Result<Vec<Vec<String>>, FeedError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Lowercase, trim and collapse runs of whitespace.
fn normalize_header(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns the index of the first header cell matching a candidate name.
///
/// Candidates are tried in priority order. A header cell matches when its
/// normalized text equals the candidate, contains it, or is contained by it,
/// so `"Retail Price"` matches `"Retail"` and `"SKU"` matches `"SKU Code"`.
/// Blank header cells never match.
#[must_use]
pub fn find_column_index<S: AsRef<str>>(header: &[String], candidates: &[S]) -> Option<usize> {
    find_unclaimed_column(header, candidates, &HashSet::new())
}

/// [`find_column_index`] with the columns in `claimed` treated as blank.
pub(crate) fn find_unclaimed_column<S: AsRef<str>>(
    header: &[String],
    candidates: &[S],
    claimed: &HashSet<usize>,
) -> Option<usize> {
    let normalized: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
    candidates.iter().find_map(|candidate| {
        let candidate = normalize_header(candidate.as_ref());
        normalized.iter().enumerate().find_map(|(i, h)| {
            let matched = !h.is_empty()
                && !claimed.contains(&i)
                && (*h == candidate || h.contains(&candidate) || candidate.contains(h.as_str()));
            matched.then_some(i)
        })
    })
}

/// Trimmed cell text, `None` when the column is unresolved, out of range or
/// the cell is empty.
#[must_use]
pub fn cell_str(row: &[String], index: Option<usize>) -> Option<&str> {
    let value = row.get(index?)?.trim();
    (!value.is_empty()).then_some(value)
}

/// Cell text with currency symbols, thousands separators and whitespace
/// removed, cut down to its leading numeric token.
fn numeric_token(row: &[String], index: Option<usize>) -> Option<String> {
    let cleaned: String = cell_str(row, index)?
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | ',') && !c.is_whitespace())
        .collect();
    NUMERIC_PREFIX
        .find(&cleaned)
        .map(|m| m.as_str().to_string())
}

/// Float cell; `None` when unparseable or not finite.
#[must_use]
pub fn cell_num(row: &[String], index: Option<usize>) -> Option<f64> {
    numeric_token(row, index)?
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Money cell, parsed straight to a decimal so `"10.10"` stays exact.
#[must_use]
pub fn cell_decimal(row: &[String], index: Option<usize>) -> Option<Decimal> {
    let token = numeric_token(row, index)?;
    Decimal::from_str(&token)
        .or_else(|_| Decimal::from_scientific(&token))
        .ok()
}

/// Boolean cell using the feed vocabulary (case-insensitive):
/// `1 y yes true discontinued` are true, `0 n no false` are false, anything
/// else is `None`.
#[must_use]
pub fn cell_bool(row: &[String], index: Option<usize>) -> Option<bool> {
    parse_flag(cell_str(row, index)?)
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "y" | "yes" | "true" | "discontinued" => Some(true),
        "0" | "n" | "no" | "false" => Some(false),
        _ => None,
    }
}
