/// Records parsed from one feed file, with the row accounting needed for the
/// import summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed<T> {
    pub records: Vec<T>,
    /// Data rows in the file, header rows excluded.
    pub data_rows: usize,
    /// Data rows dropped because their SKU cell was blank.
    pub skipped: usize,
}

impl<T> ParsedFeed<T> {
    /// Wraps records that did not come from a file; nothing was skipped.
    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        Self {
            data_rows: records.len(),
            skipped: 0,
            records,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
