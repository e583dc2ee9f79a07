//! Declarative column layouts resolved once per file into a flat
//! key-to-index map.
//!
//! Repeated column blocks ("Box 1 .. Box 10", "Image 1 .. Image 20") are
//! described as templates with an `{n}` placeholder instead of one entry per
//! index, so adding a repeat group is a one-line change.

use std::collections::{HashMap, HashSet};

use crate::reader::{find_column_index, find_unclaimed_column};

/// Placeholder replaced by the 1-based repeat index.
const INDEX_PLACEHOLDER: &str = "{n}";

/// A logical field and its header candidates in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub candidates: &'static [&'static str],
}

/// A block of fields repeated `count` times. `{n}` in the key and in every
/// candidate is replaced by `1..=count`.
///
/// Repeat fields only resolve to columns no other field has claimed, so a
/// plain `EAN` header is never read as `Box 4 EAN` and `Image 1` is never
/// read as `Image 10`.
#[derive(Debug, Clone, Copy)]
pub struct RepeatGroup {
    pub count: u8,
    pub fields: &'static [FieldSpec],
}

/// Resolved column indices. Keys with no matching header are absent.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<String, usize>,
}

impl ColumnMap {
    #[must_use]
    pub fn resolve(header: &[String], fields: &[FieldSpec], groups: &[RepeatGroup]) -> Self {
        let mut columns = HashMap::new();
        let mut claimed = HashSet::new();

        // Plain fields may share a column (e.g. a "Status" column read both
        // as text and as a flag).
        for field in fields {
            if let Some(index) = find_column_index(header, field.candidates) {
                columns.insert(field.key.to_string(), index);
                claimed.insert(index);
            }
        }

        for group in groups {
            for n in 1..=group.count {
                for field in group.fields {
                    let candidates: Vec<String> = field
                        .candidates
                        .iter()
                        .map(|c| expand_template(c, n))
                        .collect();
                    if let Some(index) = find_unclaimed_column(header, &candidates, &claimed) {
                        columns.insert(expand_template(field.key, n), index);
                        claimed.insert(index);
                    }
                }
            }
        }

        Self { columns }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<usize> {
        self.columns.get(key).copied()
    }

    /// Index of repeat-group field `template` for repeat `n`.
    #[must_use]
    pub fn indexed(&self, template: &str, n: u8) -> Option<usize> {
        self.get(&expand_template(template, n))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn expand_template(template: &str, n: u8) -> String {
    template.replace(INDEX_PLACEHOLDER, &n.to_string())
}
