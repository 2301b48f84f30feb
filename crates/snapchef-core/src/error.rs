//! Core error types for snapchef-core.
//!
//! Every fallible operation in the library funnels into [`CoreError`]. The
//! cloud variant carries the single user-facing "failed, try again" message
//! the app shows for any upstream failure.

use std::path::PathBuf;
use thiserror::Error;

/// Message shown to the user for any failed cloud round-trip.
pub const CLOUD_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Core error type for snapchef-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notification center errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote record store failures
    #[error("Cloud {operation} failed: {message}")]
    Cloud {
        operation: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Build a cloud error for `operation`.
    pub fn cloud(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Cloud {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Text suitable for an alert. Cloud failures collapse into one generic
    /// message; everything else shows its own description.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Cloud { .. } => CLOUD_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Notification center errors.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The center could not be read
    #[error("Notification center unavailable: {0}")]
    Unavailable(String),

    /// A request could not be added
    #[error("Failed to schedule '{identifier}': {message}")]
    SchedulingFailed { identifier: String, message: String },

    /// Requests could not be removed
    #[error("Failed to remove pending notifications: {0}")]
    RemovalFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_errors_show_generic_message() {
        let err = CoreError::cloud("fetch streak", "503 from server");
        assert_eq!(err.user_message(), CLOUD_FAILURE_MESSAGE);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn other_errors_show_their_description() {
        let err = CoreError::from(ConfigError::UnknownKey("ui.theme".into()));
        assert_eq!(
            err.user_message(),
            "Configuration error: Unknown configuration key: ui.theme"
        );
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(DatabaseError::from(sqlite_err), DatabaseError::Locked));
    }
}
