//! Long-running searches, executed off the async runtime.
//!
//! Both searches snapshot the query from the state, walk the tree on a
//! blocking worker, and then replace the result table in one step.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use tokio::task::JoinError;

use super::events::UserEvent;
use super::helpers::lock_state;
use super::proxy::EventProxy;
use super::state::AppState;
use crate::core::{CoreError, DiagnosticsSink, NameQuery, ResultSet, SearchEngine};

/// Runs a name search with the current query. Returns the number of rows.
pub async fn start_file_search<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) -> Result<usize> {
    let (root, names, sink) = begin_search(&state);

    tracing::info!("LOG: TASK:: file search in {} started.", root.display());
    let outcome = tokio::task::spawn_blocking(move || {
        SearchEngine::search_files(&root, &names, sink.as_ref()).map(|found| found.results)
    })
    .await;

    finish_search(outcome, &proxy, &state)
}

/// Runs a content search with the current query. Returns the number of rows.
///
/// An empty content query is rejected before anything is touched.
pub async fn start_content_search<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) -> Result<usize> {
    let (content_pattern, use_regex) = {
        let state_guard = lock_state(&state);
        (
            state_guard.query.content_query.clone(),
            state_guard.query.content_regex,
        )
    };

    if content_pattern.is_empty() {
        proxy.send_event(UserEvent::ShowError(
            "Please enter a content search query.".to_string(),
        ));
        bail!("missing content search query");
    }

    let (root, names, sink) = begin_search(&state);

    tracing::info!("LOG: TASK:: content search in {} started.", root.display());
    let outcome = tokio::task::spawn_blocking(move || {
        SearchEngine::search_tree_content(&root, &names, &content_pattern, use_regex, sink.as_ref())
    })
    .await;

    finish_search(outcome, &proxy, &state)
}

fn begin_search(state: &Arc<Mutex<AppState>>) -> (PathBuf, NameQuery, Arc<dyn DiagnosticsSink>) {
    let mut state_guard = lock_state(state);
    state_guard.is_searching = true;
    state_guard.results.clear();
    (
        state_guard.query.dir_path.clone(),
        state_guard.query.name_query(),
        Arc::clone(&state_guard.sink),
    )
}

fn finish_search<P: EventProxy>(
    outcome: Result<Result<ResultSet, CoreError>, JoinError>,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> Result<usize> {
    let mut state_guard = lock_state(state);
    state_guard.is_searching = false;

    match outcome {
        Ok(Ok(results)) => {
            let rows = results.len();
            state_guard.results = results;
            proxy.send_event(UserEvent::ResultsUpdated(Box::new(
                state_guard.results_view(),
            )));
            if rows == 0 {
                proxy.send_event(UserEvent::NoResults);
            }
            Ok(rows)
        }
        Ok(Err(e)) => {
            tracing::error!("LOG: TASK:: search failed: {}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
            Err(e.into())
        }
        Err(e) => {
            tracing::error!("LOG: TASK:: search worker failed: {}", e);
            proxy.send_event(UserEvent::ShowError("The search was interrupted.".to_string()));
            Err(anyhow!("search worker failed: {e}"))
        }
    }
}
