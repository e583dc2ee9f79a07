//! SKU canonicalization shared by the details and price feeds.
//!
//! Both feeds key their rows by SKU, and the two exports are produced by
//! different tools. Spreadsheet exporters rewrite long numeric SKUs as
//! scientific notation (`1.01291E+12`), and humans type the same code as
//! `FTG-001`, `ftg 001` or ` FTG001 `. Everything that crosses a feed boundary
//! goes through [`NormalizedSku::from_raw`] so the join key is identical on
//! both sides.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `<mantissa>[.<fraction>]e[+]<exponent>`, case-insensitive, whole string.
static SCIENTIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+\.?\d*)e\+?(\d+)$").expect("valid scientific-notation regex")
});

/// Upper bound on the length of an expanded digit string. Anything longer is
/// not a SKU; the input is returned untouched so the caller flags it.
const MAX_EXPANDED_DIGITS: usize = 64;

/// Expands spreadsheet scientific notation back to the exact integer digits.
///
/// `"1.01291E+12"` becomes `"1012910000000"`. The decimal point is shifted by
/// string manipulation only, so no precision is lost. When the exponent is
/// smaller than the number of fractional digits the mantissa is truncated,
/// not rounded (`"1.23456E+2"` becomes `"123"`); previously stored SKUs were
/// produced that way and must keep matching byte for byte.
///
/// Input that does not match the pattern is returned unchanged.
#[must_use]
pub fn expand_scientific_notation(raw: &str) -> String {
    let Some(caps) = SCIENTIFIC.captures(raw.trim()) else {
        return raw.to_owned();
    };
    let Ok(exponent) = caps[2].parse::<usize>() else {
        return raw.to_owned();
    };

    let mantissa = &caps[1];
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        stripped => stripped,
    };
    let digits = format!("{int_part}{frac_part}");

    if exponent >= frac_part.len() {
        let zeros = exponent - frac_part.len();
        if zeros > MAX_EXPANDED_DIGITS.saturating_sub(digits.len()) {
            return raw.to_owned();
        }
        return format!("{digits}{}", "0".repeat(zeros));
    }

    // int_part is never empty, so at least one digit survives.
    let keep = int_part.len() + exponent;
    digits[..keep].to_owned()
}

/// Canonicalizes a SKU: trim, uppercase, then drop every hyphen and every
/// whitespace character.
///
/// Empty input normalizes to the empty string; callers treat that as absent.
/// The function is idempotent.
#[must_use]
pub fn normalize_sku(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// A SKU that has been through [`normalize_sku`]. Never empty.
///
/// Contains no whitespace, no hyphens and no lowercase letters. A value that
/// still contains `E+` after expansion is representable but reported by
/// [`NormalizedSku::looks_corrupted`] so the caller can flag the row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedSku(String);

impl NormalizedSku {
    /// Builds a join key from a raw feed cell: scientific-notation expansion
    /// first, then normalization. Returns `None` for blank cells.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::new(&expand_scientific_notation(raw))
    }

    /// Normalizes an already-expanded value (e.g. one read back from the
    /// store). Returns `None` when nothing is left.
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let normalized = normalize_sku(value);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the value still carries scientific notation, i.e. the
    /// exporter produced a format expansion did not anticipate.
    #[must_use]
    pub fn looks_corrupted(&self) -> bool {
        self.0.contains("E+")
    }
}

impl fmt::Display for NormalizedSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedSku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NormalizedSku {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("empty SKU: {value:?}"))
    }
}

impl From<NormalizedSku> for String {
    fn from(value: NormalizedSku) -> Self {
        value.0
    }
}
