//! Error types for ddl_tools

use thiserror::Error;

/// Result type for ddl_tools operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ddl_tools
///
/// Only construction and I/O problems are errors. Validation findings are collected in a
/// `ValidationResult`, and the parser and differ degrade instead of failing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid column type: {0}")]
    InvalidColumnType(String),

    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Convert Serde JSON errors to ddl_tools errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to ddl_tools errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(format!("Failed to parse config file: {}", error))
    }
}
