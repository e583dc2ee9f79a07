use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which supplier export a file or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Details,
    Price,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Details => write!(f, "details"),
            FeedKind::Price => write!(f, "price"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{feed} feed not found at {}", .path.display())]
    FileNotFound { feed: FeedKind, path: PathBuf },

    #[error(
        "no {feed} feed matching /{pattern}/ in {}; available .csv files: {}",
        .dir.display(),
        format_candidates(.candidates)
    )]
    NoMatchingFile {
        feed: FeedKind,
        dir: PathBuf,
        pattern: String,
        candidates: Vec<String>,
    },

    #[error("{feed} feed has {rows} row(s), too few for its header layout")]
    MissingHeader { feed: FeedKind, rows: usize },

    #[error("could not find SKU column in {feed} feed; header: {}", .header.join(", "))]
    MissingSkuColumn { feed: FeedKind, header: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "(none)".to_string()
    } else {
        candidates.join(", ")
    }
}
