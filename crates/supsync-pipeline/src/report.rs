//! Operator-facing summaries printed at the end of each command.

use std::fmt;

use supsync_core::NormalizedSku;

/// A SKU that was not processed, with the reason shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuIssue {
    pub sku: NormalizedSku,
    pub reason: String,
}

impl SkuIssue {
    pub fn new(sku: &NormalizedSku, reason: impl Into<String>) -> Self {
        Self {
            sku: sku.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkuIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sku, self.reason)
    }
}

/// Writes `heading (first N):` followed by up to `limit` indented items and an
/// `... and N more.` line when the list is longer. Writes nothing for an
/// empty list.
pub(crate) fn write_sample<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    items: &[T],
    limit: usize,
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{heading} (first {limit}):")?;
    for item in items.iter().take(limit) {
        writeln!(f, "  {item}")?;
    }
    if items.len() > limit {
        writeln!(f, "  ... and {} more.", items.len() - limit)?;
    }
    Ok(())
}
