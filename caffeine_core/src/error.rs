//! Error types for the caffeine_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for caffeine_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
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

    /// An interval whose start is not before its end
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A dose that is not a positive, finite amount
    #[error("Invalid dose: {0}")]
    InvalidDose(String),

    /// Malformed command-line or file input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
