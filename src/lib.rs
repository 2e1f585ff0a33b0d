//! nimlink - NIM host-integration bootstrap
//!
//! This library crate exposes the bootstrap and its collaborators for hosts
//! and for integration testing. Preferences storage lives in `nimlink-prefs`.

pub mod api;
pub mod bootstrap;
pub mod panel;
pub mod ui;

pub use bootstrap::{Bootstrap, HostApp};
pub use nimlink_prefs::PrefsStore;
