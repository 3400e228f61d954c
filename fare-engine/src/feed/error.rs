//! Feed loading error types.

use std::path::PathBuf;

use crate::domain::DomainError;

/// Errors that can occur when reading fare records or itineraries.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for the expected document
    #[error("JSON parse error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required column is absent or empty
    #[error("missing required field {0}")]
    MissingField(&'static str),

    /// A column holds a value that cannot be parsed
    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    /// Document content violates a domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),
}
