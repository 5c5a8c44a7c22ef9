//! Error types for reapcache
//!
//! The cache operations themselves are total. These errors cover the
//! surfaces around them: configuration loading and the command loop.

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Environment variable present but not parsable
    #[error("Invalid value {value:?} for environment variable {name}")]
    EnvVar { name: String, value: String },

    /// Command name not present in the command table
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command invoked without a required argument
    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error from the command loop
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, CacheError>;
