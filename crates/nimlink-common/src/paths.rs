//! Path utilities for configured script directories and preference files.
//!
//! Script paths come from a human-edited preferences file and may use either
//! separator convention regardless of the platform we run on, so they are
//! handled as strings here rather than through [`std::path::Path`] joins.

use std::path::PathBuf;

/// Directory holding the preferences and key files.
pub const DEFAULT_PREFS_DIR: &str = "~/.nim/";

/// File name of the preferences file inside [`DEFAULT_PREFS_DIR`].
pub const PREFS_FILE_NAME: &str = "prefs.nim";

/// File name of the auth-token file inside [`DEFAULT_PREFS_DIR`].
pub const KEY_FILE_NAME: &str = "nim.key";

/// Path separator convention used by a configured path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorStyle {
    /// `/`, used on macOS, Linux and for mixed paths.
    Slash,
    /// `\`, used when a path contains backslashes and no forward slash.
    Backslash,
}

impl SeparatorStyle {
    /// Detect the convention of `path`.
    ///
    /// A path counts as backslash-style only when it contains at least one
    /// `\` and no `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nimlink_common::paths::SeparatorStyle;
    ///
    /// assert_eq!(SeparatorStyle::detect("/mnt/nim"), SeparatorStyle::Slash);
    /// assert_eq!(SeparatorStyle::detect(r"\\server\nim"), SeparatorStyle::Backslash);
    /// assert_eq!(SeparatorStyle::detect(r"C:\nim/scripts"), SeparatorStyle::Slash);
    /// ```
    pub fn detect(path: &str) -> Self {
        if path.contains('\\') && !path.contains('/') {
            Self::Backslash
        } else {
            Self::Slash
        }
    }

    /// The separator character for this style.
    pub fn separator(self) -> char {
        match self {
            Self::Slash => '/',
            Self::Backslash => '\\',
        }
    }

    /// Join `segments` with this separator, with a trailing separator.
    pub fn join_dir(self, base: &str, segments: &[&str]) -> String {
        let sep = self.separator();
        let mut out = String::with_capacity(base.len() + 32);
        out.push_str(base);
        for segment in segments {
            out.push(sep);
            out.push_str(segment);
        }
        out.push(sep);
        out
    }
}

/// Strip every trailing `/` and `\` from `path`.
///
/// # Examples
///
/// ```
/// use nimlink_common::paths::trim_trailing_separators;
///
/// assert_eq!(trim_trailing_separators("/a/b///"), "/a/b");
/// assert_eq!(trim_trailing_separators(r"C:\nim\/\"), r"C:\nim");
/// assert_eq!(trim_trailing_separators("/a/b"), "/a/b");
/// ```
pub fn trim_trailing_separators(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
}

/// Expand a leading `~` in `path` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// The default preferences directory (`~/.nim/`), expanded.
pub fn default_prefs_dir() -> PathBuf {
    expand_home(DEFAULT_PREFS_DIR)
}
