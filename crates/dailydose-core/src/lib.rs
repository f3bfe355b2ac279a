//! # dailydose Core Library
//!
//! Business logic for a personal daily-habit tracker: it records whether the
//! daily intake happened, derives a running streak, and keeps reminder
//! settings. The CLI binary is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Record store**: date-keyed intake records, newest-first
//! - **Streak engine**: pure functions deriving the streak aggregate, either
//!   incrementally or by replaying the whole history
//! - **Settings store**: reminder time, notification toggle, weekly goal
//! - **Tracker**: query facade composing the above and the notifier
//! - **Storage**: SQLite key-value table and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: read helpers and atomic record writes
//! - [`update_streak`] / [`recompute_from_history`]: streak derivation
//! - [`Database`]: durable key-value store
//! - [`Notifier`]: reminder and alert delivery seam
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod notify;
pub mod record;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use clock::WallTime;
pub use error::{ConfigError, CoreError, NotifyError, StorageError, ValidationError};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use record::IntakeRecord;
pub use storage::{Config, Database, KvStore, RecordStore, SettingsStore, UserSettings};
pub use streak::{recompute_from_history, update_streak, StreakAggregate};
pub use tracker::{IntakeOutcome, Reconciliation, StreakSource, Tracker, WeeklyProgress};
