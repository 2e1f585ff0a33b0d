//! The host-UI seam: alerts and the preferences prompt.
//!
//! Hosts implement [`HostUi`] with their own dialogs. Every user-visible
//! message of the bootstrap goes through it, which is what lets tests count
//! dialogs per failure.

use nimlink_prefs::PreferencesRecord;
use std::sync::Arc;

/// Shared handle to the host UI.
pub type SharedUi = Arc<dyn HostUi>;

/// Dialogs the host provides.
pub trait HostUi: Send + Sync {
    /// Show a modal message.
    fn alert(&self, message: &str);

    /// Ask for a scripts path and API URL.
    fn prompt_preferences(&self, prompt: &PrefsPrompt) -> PromptEvent;
}

/// Content of the preferences prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefsPrompt {
    /// Why the prompt is shown.
    pub message: String,
    /// Pre-filled scripts path, when one is known.
    pub scripts_path: Option<String>,
    /// Pre-filled API URL, when one is known.
    pub api_url: Option<String>,
}

impl PrefsPrompt {
    pub fn new(message: impl Into<String>, known: &PreferencesRecord) -> Self {
        Self {
            message: message.into(),
            scripts_path: known.scripts_path.clone(),
            api_url: known.api_url.clone(),
        }
    }

    /// The record to save after the user closed the prompt, or `None` when
    /// they cancelled.
    ///
    /// An empty answer keeps the value already in `record`.
    pub fn apply(record: &PreferencesRecord, event: PromptEvent) -> Option<PreferencesRecord> {
        let PromptEvent::Confirmed {
            scripts_path,
            api_url,
        } = event
        else {
            return None;
        };

        let merge = |answer: String, known: &Option<String>| {
            if answer.is_empty() {
                known.clone()
            } else {
                Some(answer)
            }
        };
        Some(PreferencesRecord {
            scripts_path: merge(scripts_path, &record.scripts_path),
            api_url: merge(api_url, &record.api_url),
        })
    }
}

/// How the user closed the preferences prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Confirmed { scripts_path: String, api_url: String },
    Cancelled,
}
