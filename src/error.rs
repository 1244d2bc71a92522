use std::{convert::Infallible, io};

use hyper::StatusCode;
use thiserror::Error as ThisError;

/// An error carrying an HTTP status code and a human-readable message.
///
/// Handlers fail with this type (directly or via a `From` conversion), and
/// [run_handler](crate::run_handler) turns it into a JSON error body. Errors
/// without a meaningful status code of their own are treated as unclassified
/// server errors (500).
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{status_code} {message}")]
pub struct RequestError {
    pub status_code: u16,
    pub message: String,
}

impl RequestError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// The standard reason phrase for this error's status code.
    pub fn status_text(&self) -> &'static str {
        reason_phrase(self.status_code)
    }
}

impl From<Infallible> for RequestError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

impl From<io::Error> for RequestError {
    fn from(err: io::Error) -> Self {
        Self::new(500, err.to_string())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(400, err.to_string())
    }
}

/// Returns the standard reason phrase for a status code (200 -> "OK",
/// 404 -> "Not Found"), or "Unknown" for codes without an assigned phrase.
pub fn reason_phrase(status_code: u16) -> &'static str {
    StatusCode::from_u16(status_code)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}
