use crate::keys;
use crate::PrefsDiagnostic;

/// The two settings the bootstrap needs from the preferences file.
///
/// Other keys in the file are not represented here; they survive every
/// rewrite because [`crate::PrefsStore::save`] only touches the lines that
/// carry these two markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesRecord {
    /// Root of the NIM scripts checkout (`NIM_Scripts`).
    pub scripts_path: Option<String>,
    /// NIM API endpoint (`NIM_URL`).
    pub api_url: Option<String>,
}

impl PreferencesRecord {
    pub fn new(scripts_path: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            scripts_path: Some(scripts_path.into()),
            api_url: Some(api_url.into()),
        }
    }

    /// Both required settings are present.
    pub fn is_complete(&self) -> bool {
        self.scripts_path.is_some() && self.api_url.is_some()
    }

    /// What is missing, treating empty values as absent.
    pub fn diagnostic(&self) -> Option<PrefsDiagnostic> {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        PrefsDiagnostic::for_fields(present(&self.scripts_path), present(&self.api_url))
    }
}

/// Result of [`crate::PrefsStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPrefs {
    /// Whichever settings were found.
    pub record: PreferencesRecord,
    /// Set when the user should be prompted for missing values.
    pub diagnostic: Option<PrefsDiagnostic>,
}

impl LoadedPrefs {
    pub(crate) fn missing(diagnostic: PrefsDiagnostic) -> Self {
        Self {
            record: PreferencesRecord::default(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Every `KEY=VALUE` line of a preferences file, in file order.
///
/// Only the first occurrence of each key is kept. Lines without `=` and lines
/// starting with `#` are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefsEntries {
    entries: Vec<(String, String)>,
}

impl PrefsEntries {
    pub(crate) fn parse_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once('=') else {
            return;
        };
        let key = key.trim();
        if key.is_empty() || key.starts_with('#') || self.get(key).is_some() {
            return;
        }
        self.entries.push((key.to_string(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `NIM_User`, when set to a non-empty value.
    pub fn user(&self) -> Option<&str> {
        self.get(keys::USER_KEY).filter(|user| !user.is_empty())
    }

    /// `NIM_DebugMode=True` (case-insensitive).
    pub fn debug_mode(&self) -> bool {
        self.get(keys::DEBUG_MODE_KEY)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
