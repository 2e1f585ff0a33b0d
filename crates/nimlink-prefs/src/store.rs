//! The preferences store: load, create, rewrite, and token lookup.

use crate::keys::{self, SCRIPTS_MARKER, URL_MARKER};
use crate::rewrite::{self, LineUpdate};
use crate::{LoadedPrefs, PreferencesRecord, PrefsDiagnostic, PrefsEntries};
use nimlink_common::paths::{self, KEY_FILE_NAME, PREFS_FILE_NAME};
use nimlink_common::{Error, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

/// Locations of the preferences and key files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefsPaths {
    pub dir: PathBuf,
    pub prefs_file: PathBuf,
    pub key_file: PathBuf,
}

impl PrefsPaths {
    /// `~/.nim/prefs.nim` and `~/.nim/nim.key`.
    pub fn default_location() -> Self {
        Self::in_dir(paths::default_prefs_dir())
    }

    /// `prefs.nim` and `nim.key` inside `dir`.
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        Self {
            prefs_file: dir.join(PREFS_FILE_NAME),
            key_file: dir.join(KEY_FILE_NAME),
            dir,
        }
    }

    /// Scratch copy used while rewriting (`prefs.nimtemp`).
    pub fn temp_file(&self) -> PathBuf {
        let mut name: OsString = self.prefs_file.clone().into_os_string();
        name.push("temp");
        PathBuf::from(name)
    }
}

/// Flat-file store for NIM preferences.
///
/// The store owns no state besides its paths; every call reads the file
/// fresh, so edits made by other tooling between calls are picked up.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    paths: PrefsPaths,
}

impl PrefsStore {
    pub fn new(paths: PrefsPaths) -> Self {
        Self { paths }
    }

    /// Store backed by `~/.nim/`.
    pub fn open_default() -> Self {
        Self::new(PrefsPaths::default_location())
    }

    pub fn paths(&self) -> &PrefsPaths {
        &self.paths
    }

    /// Read the scripts path and API URL.
    ///
    /// Scans for the `NIM_Scripts=` and `NIM_URL=` markers anywhere in each
    /// line and stops once both have a value. An empty value does not count,
    /// so a later non-empty occurrence can still supply it. Whatever is
    /// missing is reported through [`LoadedPrefs::diagnostic`].
    pub fn load(&self) -> LoadedPrefs {
        let path = &self.paths.prefs_file;
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No preferences file at {:?}", path);
                return LoadedPrefs::missing(PrefsDiagnostic::FileNotFound);
            }
            Err(e) => {
                tracing::warn!("Failed to open preferences file {:?}: {}", path, e);
                return LoadedPrefs::missing(PrefsDiagnostic::Unreadable);
            }
        };

        let mut record = PreferencesRecord::default();
        for line in rewrite::lines(BufReader::new(file)) {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Failed to read preferences file {:?}: {}", path, e);
                    return LoadedPrefs::missing(PrefsDiagnostic::Unreadable);
                }
            };
            if record.scripts_path.is_none() {
                record.scripts_path = value_after(&line, SCRIPTS_MARKER);
            }
            if record.api_url.is_none() {
                record.api_url = value_after(&line, URL_MARKER);
            }
            if record.is_complete() {
                break;
            }
        }

        let diagnostic = record.diagnostic();
        tracing::debug!(
            scripts_path = ?record.scripts_path,
            api_url = ?record.api_url,
            "Loaded preferences"
        );
        LoadedPrefs { record, diagnostic }
    }

    /// Create the preferences directory and a fresh file if none exists.
    ///
    /// Returns `true` when a new file was written. An existing file is left
    /// untouched.
    pub fn ensure_file_exists(&self) -> Result<bool> {
        if self.paths.prefs_file.exists() {
            return Ok(false);
        }

        std::fs::create_dir_all(&self.paths.dir)?;

        let mut file = File::create(&self.paths.prefs_file)?;
        for (key, default) in keys::DEFAULT_SCHEMA {
            writeln!(file, "{key}={default}")?;
        }
        file.flush()?;

        tracing::info!("Created preferences file at {:?}", self.paths.prefs_file);
        Ok(true)
    }

    /// Write the scripts path and API URL back in place.
    ///
    /// Only the first line carrying each marker is changed, and only the text
    /// after the marker. All other lines are copied through unchanged, with
    /// line endings normalized to `\n`. A key absent from the file is not
    /// added. `None` fields are left as they are.
    pub fn save(&self, record: &PreferencesRecord) -> Result<()> {
        self.ensure_file_exists()?;

        let mut updates = Vec::with_capacity(2);
        if let Some(scripts_path) = record.scripts_path.as_deref() {
            updates.push(LineUpdate::new(SCRIPTS_MARKER, scripts_path));
        }
        if let Some(api_url) = record.api_url.as_deref() {
            updates.push(LineUpdate::new(URL_MARKER, api_url));
        }

        rewrite::rewrite_file(
            &self.paths.prefs_file,
            &self.paths.temp_file(),
            &mut updates,
            false,
        )?;
        tracing::info!("Saved preferences to {:?}", self.paths.prefs_file);
        Ok(())
    }

    /// The auth token: first line of the key file, or `""`.
    pub fn read_auth_token(&self) -> String {
        let file = match File::open(&self.paths.key_file) {
            Ok(file) => file,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to open key file {:?}: {}", self.paths.key_file, e);
                }
                return String::new();
            }
        };

        let mut line = String::new();
        if let Err(e) = BufReader::new(file).read_line(&mut line) {
            tracing::warn!("Failed to read key file {:?}: {}", self.paths.key_file, e);
            return String::new();
        }
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    /// Every `KEY=VALUE` entry of the file.
    pub fn read_all(&self) -> Result<PrefsEntries> {
        let file = File::open(&self.paths.prefs_file).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::not_found(self.paths.prefs_file.display().to_string())
            }
            _ => Error::Io(e),
        })?;

        let mut entries = PrefsEntries::default();
        for line in rewrite::lines(BufReader::new(file)) {
            entries.parse_line(&String::from_utf8_lossy(&line?));
        }
        Ok(entries)
    }

    /// A temporary copy left behind by an interrupted save exists.
    ///
    /// Such a file is never read; the next save overwrites it.
    pub fn has_orphan_temp(&self) -> bool {
        self.paths.temp_file().exists()
    }

    /// A host panel setting such as `Photoshop_jobID`.
    pub fn get_pref(&self, app: &str, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(entries) => entries.get(&keys::app_key(app, key)).map(str::to_string),
            Err(e) => {
                tracing::debug!("No preference {}_{}: {}", app, key, e);
                None
            }
        }
    }

    /// Store a host panel setting, appending the key if it is not present.
    pub fn set_pref(&self, app: &str, key: &str, value: &str) -> Result<()> {
        self.ensure_file_exists()?;

        let marker = keys::marker(&keys::app_key(app, key));
        let mut updates = [LineUpdate::new(&marker, value)];
        rewrite::rewrite_file(
            &self.paths.prefs_file,
            &self.paths.temp_file(),
            &mut updates,
            true,
        )
    }
}

/// Non-empty text following `marker` in `line`.
fn value_after(line: &[u8], marker: &str) -> Option<String> {
    let pos = rewrite::find(line, marker.as_bytes())?;
    let value = &line[pos + marker.len()..];
    if value.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(value).into_owned())
    }
}
