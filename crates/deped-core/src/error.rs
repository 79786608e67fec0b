//! Error types for the DepEd assistant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// User-correctable input problem (e.g. a query that is too short).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No relevant documents. A legitimate answer state, not a failure.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The document store could not be read during a reload.
    #[error("Document source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Duplicate content: hash={0}")]
    DuplicateContent(String),

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
