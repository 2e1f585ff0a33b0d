//! Nimlink-Prefs: the NIM preferences store.
//!
//! The preferences file (`~/.nim/prefs.nim`) is a flat, human-editable text
//! file of `KEY=VALUE` lines shared with other NIM tooling. This crate reads
//! the two settings the bootstrap needs (`NIM_Scripts` and `NIM_URL`),
//! rewrites them in place without disturbing any other line, and reads the
//! companion auth-token file (`~/.nim/nim.key`).
//!
//! Every operation degrades to a soft signal: [`PrefsStore::load`] never
//! fails and reports problems through a [`PrefsDiagnostic`], and
//! [`PrefsStore::read_auth_token`] returns an empty string on any failure.
//!
//! # Examples
//!
//! ```no_run
//! use nimlink_prefs::{PreferencesRecord, PrefsStore};
//!
//! let store = PrefsStore::open_default();
//! let loaded = store.load();
//! if let Some(diagnostic) = &loaded.diagnostic {
//!     println!("{diagnostic}");
//! }
//!
//! let record = PreferencesRecord::new("/mnt/nim/scripts", "http://nim/nimAPI.php?");
//! store.save(&record)?;
//! # Ok::<(), nimlink_common::Error>(())
//! ```

mod diagnostic;
pub mod keys;
mod record;
mod rewrite;
mod store;

pub use diagnostic::PrefsDiagnostic;
pub use record::{LoadedPrefs, PreferencesRecord, PrefsEntries};
pub use store::{PrefsPaths, PrefsStore};
