//! Locates feed files on disk.
//!
//! Resolution order: an explicit path (command-line argument), then the
//! configured path (environment), then the first file in the feed directory
//! whose name matches the feed's pattern.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{FeedError, FeedKind};

const DETAILS_PATTERN: &str = r"(?i)Product Details.*ALL PRODUCTS.*\.csv";
const PRICE_PATTERN: &str = r"(?i)Price.?List.*\.csv";

static DETAILS_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DETAILS_PATTERN).expect("valid details filename regex"));
static PRICE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PRICE_PATTERN).expect("valid price filename regex"));

impl FeedKind {
    fn file_pattern(self) -> &'static Regex {
        match self {
            FeedKind::Details => &DETAILS_FILE,
            FeedKind::Price => &PRICE_FILE,
        }
    }
}

/// Resolves the file for `feed`.
///
/// Relative paths are resolved against the current directory. An explicit or
/// configured path that does not exist is an error; the directory scan is
/// only used when neither is given.
///
/// # Errors
///
/// Returns [`FeedError::FileNotFound`] for a missing explicit/configured path,
/// [`FeedError::NoMatchingFile`] (listing the directory's `.csv` files) when
/// the scan finds nothing, and [`FeedError::Io`] if the directory cannot be
/// read.
pub fn resolve_feed_path(
    feed: FeedKind,
    explicit: Option<&Path>,
    configured: Option<&Path>,
    dir: &Path,
) -> Result<PathBuf, FeedError> {
    if let Some(path) = explicit.or(configured) {
        let resolved = absolutize(path)?;
        if resolved.is_file() {
            return Ok(resolved);
        }
        return Err(FeedError::FileNotFound {
            feed,
            path: resolved,
        });
    }

    let dir = absolutize(dir)?;
    let names = list_file_names(&dir)?;
    let pattern = feed.file_pattern();

    if let Some(name) = names.iter().find(|name| pattern.is_match(name)) {
        let path = dir.join(name);
        tracing::debug!(%feed, path = %path.display(), "feed file found by pattern");
        return Ok(path);
    }

    let candidates = names
        .into_iter()
        .filter(|name| name.to_lowercase().ends_with(".csv"))
        .collect();
    Err(FeedError::NoMatchingFile {
        feed,
        dir,
        pattern: pattern.as_str().to_string(),
        candidates,
    })
}

fn absolutize(path: &Path) -> Result<PathBuf, FeedError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

/// Sorted names of the regular files directly inside `dir`.
fn list_file_names(dir: &Path) -> Result<Vec<String>, FeedError> {
    let io_err = |source| FeedError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
