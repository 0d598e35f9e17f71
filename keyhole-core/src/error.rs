//! Errors

use thiserror::Error;

/// Catch-all error for serialization and file handling.
#[derive(Debug, Error)]
pub enum GenericError {
    /// IO error
    FileError(#[from] std::io::Error),
    /// Serialization error
    SerdeError(#[from] serde_json::Error),
    /// Unspecified error
    Generic(String),
}

impl std::fmt::Display for GenericError {

    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {:?}", self)
    }

}
