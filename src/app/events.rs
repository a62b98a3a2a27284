//! Defines the events sent from the command layer to whatever presents them.

use super::state::ResultsView;
use crate::core::BatchOperation;

/// Events sent from the application layer to the presentation layer.
#[derive(Debug)]
pub enum UserEvent {
    /// The result table changed (new search, filter, or batch reconciliation).
    ResultsUpdated(Box<ResultsView>),
    /// A completed search produced no rows.
    NoResults,
    /// An error message to be displayed to the user.
    ShowError(String),
    /// A batch finished. `failures` holds one message per failed item.
    BatchFinished {
        operation: BatchOperation,
        succeeded: usize,
        failures: Vec<String>,
    },
    /// A plain notice, e.g. a cancelled operation or a saved query.
    Info(String),
}
