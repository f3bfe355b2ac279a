//! Core error types for dailydose-core.
//!
//! Storage faults are split into read and write failures: reads are
//! recovered by the [`Tracker`](crate::Tracker) with documented defaults,
//! writes always propagate so callers never assume data was saved.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dailydose-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// A read from the store failed
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// A write to the store failed; nothing was persisted
    #[error("Failed to write {keys:?}: {message}")]
    WriteFailed { keys: Vec<String>, message: String },

    /// A stored value exists but cannot be decoded
    #[error("Stored value for '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },

    /// Store is locked by another connection
    #[error("Store is locked")]
    Locked,
}

impl StorageError {
    /// Whether this error came from reading (and may be recovered with defaults).
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            StorageError::ReadFailed { .. } | StorageError::Corrupt { .. }
        )
    }

    /// Map a SQLite failure while reading `key`.
    pub(crate) fn read(key: &str, err: rusqlite::Error) -> Self {
        if is_locked(&err) {
            return StorageError::Locked;
        }
        StorageError::ReadFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    /// Map a SQLite failure while writing `keys`.
    pub(crate) fn write(keys: &[&str], err: rusqlite::Error) -> Self {
        if is_locked(&err) {
            return StorageError::Locked;
        }
        StorageError::WriteFailed {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            message: err.to_string(),
        }
    }
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/data directory could not be resolved
    #[error("Could not resolve data directory: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wall-clock time not in HH:MM form
    #[error("Invalid time '{0}': expected HH:MM (24-hour)")]
    InvalidTime(String),

    /// Calendar date not in yyyy-MM-dd form
    #[error("Invalid date '{0}': expected yyyy-MM-dd")]
    InvalidDate(String),

    /// Date lies after the current calendar day
    #[error("Cannot record intake for {date}: it is after today ({today})")]
    FutureDate {
        date: chrono::NaiveDate,
        today: chrono::NaiveDate,
    },

    /// Weekly goal outside 1..=7
    #[error("Weekly goal must be between 1 and 7, got {0}")]
    WeeklyGoalOutOfRange(u8),

    /// Aggregate breaks `best >= current` or `total >= current`
    #[error("Streak aggregate invariant violated: {0}")]
    BrokenAggregate(String),
}

/// Notification service errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Delivery or scheduling failed
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

fn is_locked(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseLocked
                || e.code == rusqlite::ErrorCode::DatabaseBusy
    )
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failures_are_classified() {
        let read = StorageError::ReadFailed {
            key: "k".into(),
            message: "boom".into(),
        };
        let corrupt = StorageError::Corrupt {
            key: "k".into(),
            message: "bad json".into(),
        };
        let write = StorageError::WriteFailed {
            keys: vec!["k".into()],
            message: "disk full".into(),
        };
        assert!(read.is_read_failure());
        assert!(corrupt.is_read_failure());
        assert!(!write.is_read_failure());
        assert!(!StorageError::Locked.is_read_failure());
    }

    #[test]
    fn storage_error_converts_into_core_error() {
        let err: CoreError = StorageError::Locked.into();
        assert_eq!(err.to_string(), "Storage error: Store is locked");
    }

    #[test]
    fn validation_messages_name_the_input() {
        let err = ValidationError::InvalidTime("25:00".into());
        assert!(err.to_string().contains("25:00"));
        let err = ValidationError::WeeklyGoalOutOfRange(9);
        assert!(err.to_string().contains('9'));
    }
}
