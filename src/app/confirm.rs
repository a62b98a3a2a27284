//! The yes/no gate every batch operation must pass before it runs.

use std::io::{self, BufRead, Write};

/// Defines a common interface for confirmation prompts.
/// This allows for a scripted implementation during tests, avoiding the need
/// to interact with a real terminal.
pub trait ConfirmationService: Send + Sync {
    /// Shows `prompt` and returns `true` only on an explicit yes.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Asks on stderr and reads the answer from stdin. Anything but `y`/`yes`
/// (including a read error or EOF) counts as no.
pub struct TerminalPrompt;

impl ConfirmationService for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr();
        if write!(stderr, "{prompt} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Approves everything. Used for `--yes`.
pub struct AssumeYes;

impl ConfirmationService for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::info!("Auto-confirmed: {}", prompt);
        true
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
