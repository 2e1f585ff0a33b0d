//! Nimlink-Common: Shared error type and path utilities.
//!
//! This crate provides functionality used by both the preferences store and
//! the bootstrap loader:
//!
//! - **Error Handling**: [`Error`] and the [`Result`] alias
//! - **Path Utilities**: separator-style detection, trailing separator
//!   trimming, and the default `~/.nim/` locations
//!
//! # Examples
//!
//! ```
//! use nimlink_common::paths::{trim_trailing_separators, SeparatorStyle};
//!
//! assert_eq!(trim_trailing_separators("/mnt/nim///"), "/mnt/nim");
//! assert_eq!(SeparatorStyle::detect(r"C:\nim\scripts"), SeparatorStyle::Backslash);
//! ```

pub mod error;
pub mod paths;

pub use error::{Error, Result};
