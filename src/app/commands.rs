//! Contains the command handlers a front end calls after a search.
//!
//! These handlers interact with the `AppState` and the `core` logic, and send
//! `UserEvent`s back to the presentation layer. Every batch operation goes
//! through a `ConfirmationService` first.

use super::confirm::ConfirmationService;
use super::events::UserEvent;
use super::export;
use super::helpers::{lock_state, with_state_and_notify};
use super::proxy::EventProxy;
use super::state::AppState;
use crate::config::{settings, SearchQuery};
use crate::core::{
    apply_filter as filter_results, dedupe_paths, BatchOperation, BatchProcessor, BatchReport,
    RenamePattern,
};
use anyhow::{anyhow, bail, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Replaces the current query.
pub fn with_query(state: &Arc<Mutex<AppState>>, query: SearchQuery) {
    lock_state(state).query = query;
}

/// Paths of the currently visible rows, in display order, without duplicates.
pub fn visible_selection(state: &Arc<Mutex<AppState>>) -> Vec<PathBuf> {
    let state_guard = lock_state(state);
    dedupe_paths(state_guard.results.visible_rows().map(|row| row.path.clone()))
}

/// Applies the filter fields of the current query to the result table.
///
/// An invalid filter value changes nothing. Returns the number of hidden rows.
pub fn apply_filter<P: EventProxy>(proxy: &P, state: &Arc<Mutex<AppState>>) -> Result<usize> {
    let criterion = {
        let state_guard = lock_state(state);
        state_guard.query.filter_criterion()
    };

    let criterion = match criterion {
        Ok(criterion) => criterion,
        Err(e) => {
            proxy.send_event(UserEvent::ShowError(e.to_string()));
            return Err(e.into());
        }
    };

    Ok(with_state_and_notify(state, proxy, |s| {
        let sink = Arc::clone(&s.sink);
        filter_results(&mut s.results, &criterion, sink.as_ref());
        s.results.len() - s.results.visible_rows().count()
    }))
}

/// Renames every selected item according to `pattern`.
///
/// Returns `None` when nothing was attempted: empty selection, empty
/// pattern, or a declined confirmation.
pub fn rename_selected<P: EventProxy, C: ConfirmationService + ?Sized>(
    selection: &[PathBuf],
    pattern: &str,
    confirm: &C,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> Option<BatchReport> {
    if pattern.is_empty() {
        tracing::info!("Rename skipped: no pattern given.");
        return None;
    }
    let items = confirmed_items(selection, BatchOperation::Rename, confirm, proxy)?;
    let pattern = RenamePattern::new(pattern);

    let report = with_state_and_notify(state, proxy, |s| {
        let sink = Arc::clone(&s.sink);
        BatchProcessor::rename(&items, &pattern, &mut s.results, sink.as_ref())
    });
    publish_report(BatchOperation::Rename, &report, proxy);
    Some(report)
}

/// Copies every selected file into `destination`.
///
/// Fails as a whole only when `destination` is not a usable directory.
pub fn copy_selected<P: EventProxy, C: ConfirmationService + ?Sized>(
    selection: &[PathBuf],
    destination: &Path,
    confirm: &C,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> Result<Option<BatchReport>> {
    let Some(items) = confirmed_items(selection, BatchOperation::Copy, confirm, proxy) else {
        return Ok(None);
    };

    let sink = Arc::clone(&lock_state(state).sink);
    match BatchProcessor::copy(&items, destination, sink.as_ref()) {
        Ok(report) => {
            publish_report(BatchOperation::Copy, &report, proxy);
            Ok(Some(report))
        }
        Err(e) => {
            proxy.send_event(UserEvent::ShowError(e.to_string()));
            Err(e.into())
        }
    }
}

/// Deletes every selected file or directory tree.
pub fn delete_selected<P: EventProxy, C: ConfirmationService + ?Sized>(
    selection: &[PathBuf],
    confirm: &C,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> Option<BatchReport> {
    let items = confirmed_items(selection, BatchOperation::Delete, confirm, proxy)?;

    let report = with_state_and_notify(state, proxy, |s| {
        let sink = Arc::clone(&s.sink);
        BatchProcessor::delete(&items, &mut s.results, sink.as_ref())
    });
    publish_report(BatchOperation::Delete, &report, proxy);
    Some(report)
}

/// Writes the visible rows to `target`. Returns the number of rows written.
pub fn export_results<P: EventProxy>(
    target: &Path,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> Result<usize> {
    let state_guard = lock_state(state);
    match export::write_rows(state_guard.results.visible_rows(), target) {
        Ok(rows) => {
            proxy.send_event(UserEvent::Info(format!(
                "Exported {} rows to {}",
                rows,
                target.display()
            )));
            Ok(rows)
        }
        Err(e) => {
            proxy.send_event(UserEvent::ShowError(format!("{e:#}")));
            Err(e)
        }
    }
}

/// Reads the saved queries from disk into the state.
pub fn load_saved_queries(state: &Arc<Mutex<AppState>>) -> Result<()> {
    let mut state_guard = lock_state(state);
    let saved = settings::load_queries(state_guard.queries_path.as_deref())?;
    state_guard.saved_queries = saved;
    Ok(())
}

/// Stores the current query under `name`, replacing any query of that name.
pub fn save_query<P: EventProxy>(name: &str, proxy: &P, state: &Arc<Mutex<AppState>>) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Please provide a query name.");
    }

    let mut state_guard = lock_state(state);
    let query = state_guard.query.clone();
    state_guard.saved_queries.insert(name, query);
    settings::save_queries(&state_guard.saved_queries, state_guard.queries_path.as_deref())?;

    proxy.send_event(UserEvent::Info(format!("Query '{name}' saved.")));
    Ok(())
}

/// Makes the saved query `name` the current query and returns it.
pub fn load_query(name: &str, state: &Arc<Mutex<AppState>>) -> Result<SearchQuery> {
    let mut state_guard = lock_state(state);
    let query = state_guard
        .saved_queries
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("No saved query named '{name}'"))?;
    state_guard.query = query.clone();
    tracing::info!("Loaded query '{}'", name);
    Ok(query)
}

/// Removes the saved query `name` and persists the change.
pub fn delete_query<P: EventProxy>(name: &str, proxy: &P, state: &Arc<Mutex<AppState>>) -> Result<()> {
    let mut state_guard = lock_state(state);
    if state_guard.saved_queries.remove(name).is_none() {
        bail!("No saved query named '{name}'");
    }
    settings::save_queries(&state_guard.saved_queries, state_guard.queries_path.as_deref())?;

    proxy.send_event(UserEvent::Info(format!("Query '{name}' deleted.")));
    Ok(())
}

/// Deduplicates `selection` and asks once for the whole batch.
fn confirmed_items<P: EventProxy, C: ConfirmationService + ?Sized>(
    selection: &[PathBuf],
    operation: BatchOperation,
    confirm: &C,
    proxy: &P,
) -> Option<Vec<PathBuf>> {
    let items = dedupe_paths(selection.iter().cloned());
    if items.is_empty() {
        tracing::info!("Nothing selected to {}.", operation);
        return None;
    }

    let prompt = format!(
        "You are about to {} {} item(s). Are you sure?",
        operation,
        items.len()
    );
    if !confirm.confirm(&prompt) {
        tracing::info!("User cancelled {} of {} item(s).", operation, items.len());
        proxy.send_event(UserEvent::Info(format!("Cancelled {operation}.")));
        return None;
    }

    Some(items)
}

fn publish_report<P: EventProxy>(operation: BatchOperation, report: &BatchReport, proxy: &P) {
    proxy.send_event(UserEvent::BatchFinished {
        operation,
        succeeded: report.completed.len(),
        failures: report.failed.iter().map(|e| e.to_string()).collect(),
    });
}
