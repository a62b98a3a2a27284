//! Contains helper functions to reduce boilerplate code in other `app` modules.

use std::sync::{Arc, Mutex, MutexGuard};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;

/// Locks the shared state.
pub fn lock_state(state: &Arc<Mutex<AppState>>) -> MutexGuard<'_, AppState> {
    state
        .lock()
        .expect("Mutex was poisoned. This should not happen.")
}

/// A helper function that locks the `AppState`, performs a mutation,
/// and then automatically sends a `ResultsUpdated` event.
///
/// Returns whatever the mutation returns.
pub fn with_state_and_notify<F, R, P: EventProxy>(
    state: &Arc<Mutex<AppState>>,
    proxy: &P,
    update_fn: F,
) -> R
where
    F: FnOnce(&mut AppState) -> R,
{
    let mut state_guard = lock_state(state);

    let outcome = update_fn(&mut state_guard);

    let view = state_guard.results_view();
    proxy.send_event(UserEvent::ResultsUpdated(Box::new(view)));

    outcome
}
