//! Terminal implementation of the host UI.

use nimlink::ui::{HostUi, PrefsPrompt, PromptEvent};
use std::io::{self, BufRead, Write};

/// Alerts go to stderr; the preferences prompt reads stdin.
///
/// An empty answer keeps the pre-filled value. End of input cancels.
pub struct ConsoleUi;

impl ConsoleUi {
    fn ask(&self, label: &str, current: Option<&str>) -> Option<String> {
        let current = current.unwrap_or_default();
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "{label} [{current}]: ");
        let _ = stderr.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim();
                Some(if answer.is_empty() {
                    current.to_string()
                } else {
                    answer.to_string()
                })
            }
            Err(e) => {
                tracing::warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

impl HostUi for ConsoleUi {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }

    fn prompt_preferences(&self, prompt: &PrefsPrompt) -> PromptEvent {
        eprintln!("{}", prompt.message);
        let Some(scripts_path) = self.ask("Scripts path", prompt.scripts_path.as_deref()) else {
            return PromptEvent::Cancelled;
        };
        let Some(api_url) = self.ask("API URL", prompt.api_url.as_deref()) else {
            return PromptEvent::Cancelled;
        };
        PromptEvent::Confirmed {
            scripts_path,
            api_url,
        }
    }
}
