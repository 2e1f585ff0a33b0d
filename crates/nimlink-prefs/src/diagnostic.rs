use std::fmt;

/// Why a loaded preferences file cannot be used as-is.
///
/// The display text is shown to the user above the preferences prompt, so it
/// names exactly which required setting is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefsDiagnostic {
    /// No preferences file exists yet.
    FileNotFound,
    /// The file exists but could not be read.
    Unreadable,
    /// `NIM_Scripts` is present, `NIM_URL` is not.
    MissingApiUrl,
    /// `NIM_URL` is present, `NIM_Scripts` is not.
    MissingScriptsPath,
    /// Neither required key has a value.
    MissingBoth,
}

impl PrefsDiagnostic {
    /// Pick the diagnostic for a scan of an existing file.
    pub(crate) fn for_fields(has_scripts: bool, has_url: bool) -> Option<Self> {
        match (has_scripts, has_url) {
            (true, true) => None,
            (true, false) => Some(Self::MissingApiUrl),
            (false, true) => Some(Self::MissingScriptsPath),
            (false, false) => Some(Self::MissingBoth),
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::FileNotFound => {
                "NIM preferences file not found. To create a new one, please enter the following info:"
            }
            Self::Unreadable => {
                "NIM preferences file could not be read. Please enter the following info:"
            }
            Self::MissingApiUrl => {
                "NIM preferences file doesn't contain an API URL. Please enter one below:"
            }
            Self::MissingScriptsPath => {
                "NIM preferences file doesn't contain a scripts path. Please enter one below:"
            }
            Self::MissingBoth => {
                "NIM preferences file doesn't contain a scripts path or an API URL. Please enter them below:"
            }
        }
    }
}

impl fmt::Display for PrefsDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
