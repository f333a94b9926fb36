//! Error types for the fitcat_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ingestion, storage and maintenance operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bundled reference resource could not be found
    #[error("Resource not found: {0}")]
    FileNotFound(String),

    /// A bundled reference resource exists but has no content
    #[error("Resource is empty: {0}")]
    EmptyFile(String),

    /// A row or resource does not match the expected record schema
    #[error("Invalid data format: {0}")]
    InvalidDataFormat(String),

    /// Resource bytes could not be decoded into text
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// The storage context failed to load or commit
    #[error("Database error: {0}")]
    Database(String),

    /// A commit precondition no longer held at commit time
    #[error("Store conflict: {0}")]
    Conflict(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors that should send a resource down the fallback path
    /// instead of aborting the run. Unreadable files count, whatever the
    /// I/O cause.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_)
                | Error::EmptyFile(_)
                | Error::InvalidDataFormat(_)
                | Error::Parsing(_)
                | Error::Io(_)
        )
    }

    /// The same failure as a `Database` error, without wrapping one twice.
    pub fn into_database(self) -> Error {
        match self {
            Error::Database(_) => self,
            other => Error::Database(other.to_string()),
        }
    }
}
