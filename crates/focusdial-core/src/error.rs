//! Core error types for focusdial-core.
//!
//! Nothing in the session engine is fatal to its host: these errors surface
//! from the storage and configuration layers, and the engine logs and
//! swallows them where the degrade-gracefully rules apply.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusdial-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preference store errors
    #[error("Preference store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a [`PreferenceStore`](crate::storage::PreferenceStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored value could not be encoded or decoded
    #[error("Malformed stored value: {0}")]
    Json(#[from] serde_json::Error),

    /// Store is unreachable or rejected the write
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),

    /// Stored value has a different scalar type than requested
    #[error("Preference '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
