//! The NIM API collaborator.
//!
//! Panels talk to NIM through a single request/response function: a query
//! named by `q` plus string parameters, answered with a JSON value. This
//! module defines that seam ([`NimApi`]), the query type, and the decoding of
//! the bootstrap handshake response.
//!
//! # Module layout
//!
//! - [`http`] -- reqwest-backed implementation and its script-module loader.

pub mod http;

use nimlink_common::Result;
use serde_json::Value;

pub use http::{HttpApiLoader, HttpNimApi, KEY_HEADER, KEY_REJECTED_MESSAGE};

/// Query name used for the bootstrap handshake.
pub const TEST_API_QUERY: &str = "testAPI";

/// Out-of-band response meaning the endpoint rejected the stored auth token.
pub const KEY_ERROR_SENTINEL: &str = "keyError";

/// A NIM API request: `q` plus ordered string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    name: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// All pairs for a query string, `q` first.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        std::iter::once(("q", self.name.as_str()))
            .chain(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect()
    }
}

/// Synchronous request/response access to a NIM server.
///
/// Implementations that detect an auth-token rejection report it to the user
/// themselves and answer with [`KEY_ERROR_SENTINEL`]; callers must not report
/// it a second time.
pub trait NimApi {
    fn query(&self, query: &Query) -> Result<Value>;
}

impl<T: NimApi + ?Sized> NimApi for Box<T> {
    fn query(&self, query: &Query) -> Result<Value> {
        (**self).query(query)
    }
}

/// The decoded answer to the `testAPI` handshake.
#[derive(Debug, Clone, PartialEq)]
pub enum Handshake {
    /// An array whose first element is an object with an empty `error`.
    Ok(Vec<Value>),
    /// The endpoint rejected the auth token; already reported.
    AuthError,
    /// Anything else, including transport failures.
    Malformed(String),
}

impl Handshake {
    /// Decode the raw result of a handshake query.
    pub fn decode(response: Result<Value>) -> Self {
        let value = match response {
            Ok(value) => value,
            Err(e) => return Self::Malformed(e.to_string()),
        };

        match value {
            Value::String(ref s) if s == KEY_ERROR_SENTINEL => Self::AuthError,
            Value::Array(items) => {
                let problem = match items.first() {
                    Some(Value::Object(first)) => match first.get("error") {
                        Some(Value::String(error)) if error.is_empty() => None,
                        Some(Value::String(error)) => Some(error.clone()),
                        _ => Some("handshake object has no error field".to_string()),
                    },
                    Some(_) => Some("handshake array does not start with an object".to_string()),
                    None => Some("empty handshake response".to_string()),
                };
                match problem {
                    None => Self::Ok(items),
                    Some(problem) => Self::Malformed(problem),
                }
            }
            other => Self::Malformed(format!("unexpected handshake response: {other}")),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}
