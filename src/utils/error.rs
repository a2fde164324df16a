// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The anchor does not occur at or after the requested offset.
    #[error("Anchor not found: {0}")]
    NotFound(String),

    /// Depth never returned to zero before end-of-text.
    #[error("Unbalanced region starting at offset {start}")]
    UnbalancedRegion { start: usize },

    #[error("Open and close delimiters must differ (got '{0}' for both)")]
    InvalidDelimiters(char),

    #[error("Offset {0} is out of range or not on a character boundary")]
    InvalidOffset(usize),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
