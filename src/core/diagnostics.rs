//! Observable events raised by the core, and the sinks that receive them.
//!
//! The core never talks to a logger itself. Every component takes a
//! `&dyn DiagnosticsSink` and reports what happened; the application decides
//! whether that becomes a log line, a test assertion or nothing at all.

use super::error::{BatchOperation, ReadError};
use super::filter::FilterCriterion;
use std::path::PathBuf;
use std::sync::Mutex;

/// Which kind of scan an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Name,
    Content,
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchKind::Name => f.write_str("file search"),
            SearchKind::Content => f.write_str("content search"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    SearchStarted {
        kind: SearchKind,
        root: PathBuf,
        pattern: String,
        use_regex: bool,
    },
    /// A scan was aborted because its pattern does not compile.
    InvalidPattern {
        kind: SearchKind,
        pattern: String,
        message: String,
    },
    FileSkipped(ReadError),
    SearchFinished {
        kind: SearchKind,
        rows: usize,
    },
    NoResults {
        kind: SearchKind,
    },
    FilterApplied {
        criterion: FilterCriterion,
        hidden: usize,
    },
    FilterReset,
    ItemRenamed {
        from: PathBuf,
        to: PathBuf,
    },
    ItemCopied {
        from: PathBuf,
        to: PathBuf,
    },
    ItemDeleted {
        path: PathBuf,
        was_directory: bool,
    },
    ItemFailed {
        operation: BatchOperation,
        path: PathBuf,
        message: String,
    },
}

/// Receives core events. Implementations must tolerate being called from a
/// worker thread.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: &SearchEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn record(&self, _event: &SearchEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &SearchEvent) {
        match event {
            SearchEvent::SearchStarted {
                kind,
                root,
                pattern,
                use_regex,
            } => tracing::info!(
                "{} initiated: Path='{}', Query='{}', Regex={}",
                kind,
                root.display(),
                pattern,
                use_regex
            ),
            SearchEvent::InvalidPattern {
                kind,
                pattern,
                message,
            } => tracing::error!("Invalid regex pattern for {}: {} - {}", kind, pattern, message),
            SearchEvent::FileSkipped(err) => tracing::warn!("{}", err),
            SearchEvent::SearchFinished { kind, rows } => {
                tracing::info!("{} finished with {} rows", kind, rows)
            }
            SearchEvent::NoResults { kind } => tracing::info!("No results found for the {}.", kind),
            SearchEvent::FilterApplied { criterion, hidden } => {
                tracing::info!("Applied filter {} ({} rows hidden)", criterion, hidden)
            }
            SearchEvent::FilterReset => tracing::info!("Filter reset to None."),
            SearchEvent::ItemRenamed { from, to } => {
                tracing::info!("Renamed: {} -> {}", from.display(), to.display())
            }
            SearchEvent::ItemCopied { from, to } => {
                tracing::info!("Copied: {} to {}", from.display(), to.display())
            }
            SearchEvent::ItemDeleted {
                path,
                was_directory,
            } => {
                let what = if *was_directory { "directory" } else { "file" };
                tracing::info!("Deleted {}: {}", what, path.display())
            }
            SearchEvent::ItemFailed {
                operation,
                path,
                message,
            } => tracing::warn!("Error during {} of {}: {}", operation, path.display(), message),
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SearchEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SearchEvent> {
        self.events
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .clone()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: &SearchEvent) {
        self.events
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .push(event.clone());
    }
}
