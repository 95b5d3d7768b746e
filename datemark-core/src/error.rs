//! Error types for datemark.

use thiserror::Error;

/// Errors that can occur in datemark operations.
#[derive(Error, Debug)]
pub enum DatemarkError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid event: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Holiday lookup failed: {0}")]
    Holiday(String),

    #[error("ICS import error: {0}")]
    Import(String),
}

/// Result type alias for datemark operations.
pub type DatemarkResult<T> = Result<T, DatemarkError>;
