//! Defines the custom error types for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Every variant here is fail-fast: it aborts the requested operation and is
/// reported once. Per-item batch failures are [`ItemOperationError`] and
/// per-file read failures are reported as diagnostics events instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The search root does not exist or is not a directory.
    #[error("Path is not a valid directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    /// A search pattern could not be compiled.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    Match { pattern: String, message: String },

    /// A filter value could not be parsed for the selected filter kind.
    #[error("Invalid filter value: {0}")]
    FilterValidation(String),
}

/// The batch operation an [`ItemOperationError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Rename,
    Copy,
    Delete,
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BatchOperation::Rename => "rename",
            BatchOperation::Copy => "copy",
            BatchOperation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Why a single batch item failed.
#[derive(Debug, Error)]
pub enum ItemFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The rename pattern could not be expanded for this item.
    #[error("bad rename pattern: {0}")]
    Template(String),

    #[error("{0}")]
    Unsupported(String),
}

/// A failure isolated to one path of a batch. The batch continues past it.
#[derive(Debug, Error)]
#[error("Could not {operation} {}: {source}", .path.display())]
pub struct ItemOperationError {
    pub path: PathBuf,
    pub operation: BatchOperation,
    #[source]
    pub source: ItemFailure,
}

impl ItemOperationError {
    pub fn new(path: PathBuf, operation: BatchOperation, source: impl Into<ItemFailure>) -> Self {
        Self {
            path,
            operation,
            source: source.into(),
        }
    }
}

/// A candidate file that content search could not read. It is skipped and
/// reported; the search carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not read file {} for content search: {message}", .path.display())]
pub struct ReadError {
    pub path: PathBuf,
    pub message: String,
}
