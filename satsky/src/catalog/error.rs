//! Error types for catalog loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::elements::ElementError;

/// A catalog that cannot be loaded.
///
/// Every variant aborts the whole load: object indices are positional, so
/// skipping a bad file would silently renumber every object after it.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Element directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Invalid element file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} has {found} non-empty lines, expected 2", path.display())]
    LineCount { path: PathBuf, found: usize },

    #[error("{}: {source}", path.display())]
    Element {
        path: PathBuf,
        #[source]
        source: ElementError,
    },

    #[error("Catalog id {catalog_id} appears in both {} and {}", first.display(), second.display())]
    DuplicateId {
        catalog_id: String,
        first: PathBuf,
        second: PathBuf,
    },
}
