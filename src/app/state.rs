//! Defines the central, mutable state of the application.

use crate::config::{SavedQueries, SearchQuery};
use crate::core::{DiagnosticsSink, ResultSet, SearchResult, TracingSink};
use std::path::PathBuf;
use std::sync::Arc;

/// Holds the complete, mutable state of the application.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` so searches can run on a
/// worker thread while commands act on the results from the caller's side.
pub struct AppState {
    /// The parameters of the current (or last) search.
    pub query: SearchQuery,
    /// Rows produced by the last search, with the current visibility mask.
    pub results: ResultSet,
    /// Named queries loaded from disk.
    pub saved_queries: SavedQueries,
    /// Where saved queries are persisted. `None` means the platform default.
    pub queries_path: Option<PathBuf>,
    /// `true` while a search is running.
    pub is_searching: bool,
    /// Receives every core event.
    pub sink: Arc<dyn DiagnosticsSink>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            query: SearchQuery::default(),
            results: ResultSet::new(),
            saved_queries: SavedQueries::default(),
            queries_path: None,
            is_searching: false,
            sink: Arc::new(TracingSink),
        }
    }
}

impl AppState {
    pub fn with_sink(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            sink,
            ..Self::default()
        }
    }

    /// A snapshot of what should currently be displayed.
    pub fn results_view(&self) -> ResultsView {
        ResultsView {
            rows: self.results.visible_rows().cloned().collect(),
            total: self.results.len(),
        }
    }
}

/// Visible rows in display order, plus the total row count behind them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub rows: Vec<SearchResult>,
    pub total: usize,
}

impl ResultsView {
    pub fn hidden(&self) -> usize {
        self.total - self.rows.len()
    }
}
