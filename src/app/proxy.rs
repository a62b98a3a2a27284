//! Defines an abstraction over the event sending mechanism.

use super::events::UserEvent;

/// A trait that abstracts the sending of user events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

/// Writes events for a terminal user. Notices and errors go to stderr so
/// stdout carries only the result rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProxy;

impl EventProxy for ConsoleProxy {
    fn send_event(&self, event: UserEvent) {
        match event {
            UserEvent::ResultsUpdated(view) => {
                tracing::debug!("{} rows shown, {} hidden", view.rows.len(), view.hidden());
            }
            UserEvent::NoResults => eprintln!("No matching files or content found."),
            UserEvent::ShowError(message) => eprintln!("Error: {message}"),
            UserEvent::BatchFinished {
                operation,
                succeeded,
                failures,
            } => {
                for failure in &failures {
                    eprintln!("Error: {failure}");
                }
                eprintln!(
                    "{}: {} succeeded, {} failed",
                    operation,
                    succeeded,
                    failures.len()
                );
            }
            UserEvent::Info(message) => eprintln!("{message}"),
        }
    }
}
