//! Persisted user preferences.

use serde::{Deserialize, Serialize};

use super::{encode_json, read_json, KvStore, SETTINGS_KEY};
use crate::clock::WallTime;
use crate::error::{StorageError, ValidationError};

/// Reminder and goal preferences.
///
/// `reminder_time` is stored as given; [`UserSettings::validate`] is for
/// callers that want to enforce the `HH:MM` form before saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_reminder_time")]
    pub reminder_time: String,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: u8,
}

fn default_reminder_time() -> String {
    "10:00".into()
}
fn default_true() -> bool {
    true
}
fn default_weekly_goal() -> u8 {
    7
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            reminder_time: default_reminder_time(),
            notifications_enabled: true,
            weekly_goal: default_weekly_goal(),
        }
    }
}

impl UserSettings {
    /// Parse the reminder time.
    pub fn reminder(&self) -> Result<WallTime, ValidationError> {
        self.reminder_time.parse()
    }

    /// Check the reminder time format and the 1..=7 weekly goal.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.reminder()?;
        if !(1..=7).contains(&self.weekly_goal) {
            return Err(ValidationError::WeeklyGoalOutOfRange(self.weekly_goal));
        }
        Ok(())
    }
}

/// Single-entry settings storage.
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KvStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored settings, or defaults when none were saved.
    pub fn get(&self) -> Result<UserSettings, StorageError> {
        Ok(read_json(&self.store, SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, settings: &UserSettings) -> Result<(), StorageError> {
        self.store
            .set(SETTINGS_KEY, encode_json(SETTINGS_KEY, settings)?)?;
        tracing::debug!(
            reminder_time = %settings.reminder_time,
            notifications_enabled = settings.notifications_enabled,
            "saved settings"
        );
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SETTINGS_KEY)
    }
}
