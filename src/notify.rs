//! User-facing alerts and confirmations.
//!
//! Upload results, validation failures and removal prompts reach the user
//! through a [`Notifier`]. Notices are written to **stderr** so stdout stays
//! parseable for scripts: either as plain lines or as one JSON object per line.

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

/// Surface for messages that need the user's attention.
pub trait Notifier: Send + Sync {
    /// Shows a message. Never blocks on user input.
    fn alert(&self, message: &str);

    /// Asks a yes/no question. Returns `true` only on explicit confirmation.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Human-friendly notices on stderr; confirmations read `y`/`yes` from stdin.
pub struct StderrNotifier {
    assume_yes: bool,
}

impl StderrNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{}", message);
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !atty::is(atty::Stream::Stdin) {
            tracing::warn!(prompt, "stdin is not a terminal; declining (pass --yes to confirm)");
            return false;
        }

        {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "{} [y/N] ", prompt);
            let _ = err.flush();
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::error!("failed to read confirmation: {}", e);
                false
            }
        }
    }
}

/// Machine-readable notices: one JSON object per line on stderr.
///
/// There is no interactive channel in this mode, so confirmations are
/// answered by the `assume_yes` flag alone.
pub struct JsonNotifier {
    assume_yes: bool,
}

impl JsonNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Notifier for JsonNotifier {
    fn alert(&self, message: &str) {
        let obj = serde_json::json!({ "event": "alert", "message": message });
        let _ = writeln!(std::io::stderr().lock(), "{}", obj);
    }

    fn confirm(&self, prompt: &str) -> bool {
        let obj = serde_json::json!({
            "event": "confirm",
            "prompt": prompt,
            "confirmed": self.assume_yes
        });
        let _ = writeln!(std::io::stderr().lock(), "{}", obj);
        self.assume_yes
    }
}

/// Keeps alerts in memory and answers confirmations with a fixed reply.
/// Used when the client is embedded without a terminal.
pub struct MemoryNotifier {
    reply: bool,
    alerts: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new(reply: bool) -> Self {
        Self {
            reply,
            alerts: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn alert(&self, message: &str) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply
    }
}

/// Output mode for the CLI: human lines or JSON lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotifyMode {
    Human,
    Json,
}

impl NotifyMode {
    pub fn notifier(&self, assume_yes: bool) -> Arc<dyn Notifier> {
        match self {
            NotifyMode::Human => Arc::new(StderrNotifier::new(assume_yes)),
            NotifyMode::Json => Arc::new(JsonNotifier::new(assume_yes)),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn memory_notifier_records() {
        let n = MemoryNotifier::new(false);
        n.alert("hello");
        assert!(!n.confirm("Remove?"));
        assert_eq!(n.alerts(), vec!["hello"]);
        assert_eq!(n.prompts(), vec!["Remove?"]);
    }

    #[test]
    fn json_notifier_uses_flag() {
        assert!(JsonNotifier::new(true).confirm("Remove?"));
        assert!(!JsonNotifier::new(false).confirm("Remove?"));
    }

    #[test]
    fn stderr_notifier_without_terminal_declines() {
        assert!(StderrNotifier::new(true).confirm("Remove?"));
        // Only meaningful when the test runner has no terminal on stdin.
        if !atty::is(atty::Stream::Stdin) {
            assert!(!StderrNotifier::new(false).confirm("Remove?"));
        }
    }
}
