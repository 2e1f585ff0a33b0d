//! Common error types used throughout nimlink.
//!
//! File-layer failures, API transport failures, and script-module loading
//! failures all funnel into [`Error`]. Callers at the host boundary turn these
//! into a single user-facing message rather than propagating them further.

use std::path::PathBuf;

/// Common error type for nimlink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested file or entry was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A storage step (temporary copy, rewrite) could not be completed.
    #[error("Storage error at {path:?}: {message}")]
    Storage {
        /// The file the operation was working on.
        path: PathBuf,
        /// Human-readable error description.
        message: String,
    },

    /// The NIM API endpoint could not be reached.
    #[error("NIM API unreachable: {0}")]
    Unreachable(String),

    /// The NIM API returned a body that could not be decoded.
    #[error("Failed to decode NIM API response: {0}")]
    Decode(String),

    /// A script bundle member could not be turned into a module.
    #[error("Failed to load module {module}: {message}")]
    ModuleLoad {
        /// Manifest member name (e.g. `nimMain.jsx`).
        module: String,
        /// Human-readable error description.
        message: String,
    },

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Storage error for `path`.
    pub fn storage<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Storage {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a new Unreachable error.
    pub fn unreachable<S: Into<String>>(msg: S) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new ModuleLoad error.
    pub fn module_load<M: Into<String>, S: Into<String>>(module: M, msg: S) -> Self {
        Self::ModuleLoad {
            module: module.into(),
            message: msg.into(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
