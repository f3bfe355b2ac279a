mod config;
pub mod database;
pub mod records;
pub mod settings;

pub use config::{Config, HistoryConfig, LoggingConfig, NotificationsConfig, StorageConfig};
pub use database::Database;
pub use records::RecordStore;
pub use settings::{SettingsStore, UserSettings};

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Key holding the serialized record history, newest-first.
pub const INTAKE_HISTORY_KEY: &str = "intake_history";
/// Key holding the serialized streak aggregate.
pub const STREAK_DATA_KEY: &str = "streak_data";
/// Key holding the serialized user settings.
pub const SETTINGS_KEY: &str = "settings";
/// Key holding the RFC 3339 time of the last history write.
pub const LAST_UPDATED_KEY: &str = "last_updated";

/// Every key owned by the tracker, in the order `clear_all` removes them.
pub const ALL_KEYS: [&str; 4] = [
    INTAKE_HISTORY_KEY,
    STREAK_DATA_KEY,
    SETTINGS_KEY,
    LAST_UPDATED_KEY,
];

/// Durable string key-value storage.
///
/// Multi-key writes are all-or-nothing: on error no entry has changed.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_many(&[key])
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        (**self).set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        (**self).remove_many(keys)
    }
}

/// Decode a JSON value stored under `key`, `None` when the key is absent.
pub(crate) fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: serde::de::DeserializeOwned,
    S: KvStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Encode a value for storage under `key`.
pub(crate) fn encode_json<T: serde::Serialize>(
    key: &str,
    value: &T,
) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::WriteFailed {
        keys: vec![key.to_string()],
        message: e.to_string(),
    })
}

/// Returns the data directory.
///
/// `DAILYDOSE_HOME` wins when set. Otherwise `~/.config/dailydose`, or
/// `~/.config/dailydose-dev` when `DAILYDOSE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAILYDOSE_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAILYDOSE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dailydose-dev")
            } else {
                base_dir.join("dailydose")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
