//! Error types for configuration operations
//!
//! The drag engine itself has no recoverable errors; everything fallible
//! lives at the configuration boundary (loading, saving, watching).

use thiserror::Error;

/// Errors that can occur while loading, saving or watching configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error from serde_json
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File watcher could not be set up
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Parsed fine but a value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
