//! The search and batch-operation engine.
//!
//! Everything in here is synchronous and free of UI and persistence concerns.
//! Components report what they did through a [`DiagnosticsSink`] instead of
//! logging on their own.

pub mod batch;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod results;
pub mod search;
pub mod walker;

pub use batch::{dedupe_paths, BatchProcessor, BatchReport, CompletedItem, RenamePattern};
pub use diagnostics::{DiagnosticsSink, MemorySink, NullSink, SearchEvent, SearchKind, TracingSink};
pub use error::{BatchOperation, CoreError, ItemFailure, ItemOperationError, ReadError};
pub use filter::{apply_filter, visibility_mask, FilterCriterion, FilterKind};
pub use matcher::{matches, Matcher};
pub use results::{ResultSet, SearchResult};
pub use search::{FileSearch, NameQuery, SearchEngine};
pub use walker::{collect_all_files, TreeWalker, WalkLevel};
