use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Errors surfaced at the crate edges (persistence I/O, serialization).
///
/// The scan/merge/render algorithms themselves are total: degenerate input
/// degrades to a defined output instead of an error. Only the explicit
/// storage helpers in [`crate::entry`] return `TocError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum TocError {
    #[error("File system error: {0}")]
    Io(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("(De)serialization error: {0}")]
    Serialization(String),
}

impl From<io::Error> for TocError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => TocError::NotFound(format!("{x}")),
            _ => TocError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<JsonError> for TocError {
    fn from(src: JsonError) -> Self {
        TocError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}
