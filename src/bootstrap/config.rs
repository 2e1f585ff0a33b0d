use nimlink_common::Error;
use nimlink_prefs::PreferencesRecord;
use std::fmt;
use std::str::FromStr;

/// Host application whose script bundle is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostApp {
    #[default]
    Photoshop,
    Premiere,
}

impl HostApp {
    /// Folder under `plugins/` holding this host's scripts.
    pub fn folder(self) -> &'static str {
        match self {
            Self::Photoshop => "Photoshop",
            Self::Premiere => "Premiere",
        }
    }
}

impl fmt::Display for HostApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}

impl FromStr for HostApp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "photoshop" | "ps" => Ok(Self::Photoshop),
            "premiere" | "ppro" => Ok(Self::Premiere),
            _ => Err(Error::invalid_input(format!("unknown host application: {s}"))),
        }
    }
}

/// Settings the bootstrap runs with, derived from a complete preferences
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub scripts_path: String,
    /// API endpoint with trailing `?` removed.
    pub api_url: String,
}

impl BootstrapConfig {
    pub fn new(scripts_path: impl Into<String>, api_url: &str) -> Self {
        Self {
            scripts_path: scripts_path.into(),
            api_url: api_url.trim_end_matches('?').to_string(),
        }
    }

    /// `None` unless both settings are present and non-empty.
    pub fn from_record(record: &PreferencesRecord) -> Option<Self> {
        if record.diagnostic().is_some() {
            return None;
        }
        let scripts_path = record.scripts_path.as_deref()?;
        let api_url = record.api_url.as_deref()?;
        Some(Self::new(scripts_path, api_url))
    }

    /// The settings as a record, for pre-filling the preferences prompt.
    pub fn to_record(&self) -> PreferencesRecord {
        PreferencesRecord::new(self.scripts_path.clone(), self.api_url.clone())
    }
}
