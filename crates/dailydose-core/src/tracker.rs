//! Query facade over the record store, streak engine and settings.
//!
//! Writes are serialized by the caller: one `record_*` call must finish
//! (history, aggregate and stamp committed together) before the next starts.
//! Reads never fail; storage faults degrade to documented defaults and are
//! logged.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::clock::{local_now, WallTime};
use crate::error::{Result, StorageError, ValidationError};
use crate::notify::{apply_reminder, streak_message, Notifier};
use crate::record::{merge_record, IntakeRecord};
use crate::storage::{
    encode_json, read_json, KvStore, RecordStore, SettingsStore, UserSettings, STREAK_DATA_KEY,
};
use crate::streak::{recompute_from_history, update_streak, StreakAggregate};

/// Longest window `recent_history` will build, in days.
pub const MAX_HISTORY_DAYS: u32 = 3660;

/// Default title of the notification sent after a taken record.
pub const DEFAULT_TAKEN_TITLE: &str = "Intake logged!";

/// How a write derived its new aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakSource {
    /// Single incremental step from the stored aggregate.
    Incremental,
    /// Full replay of the stored history.
    Recomputed,
}

/// Outcome of a record write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeOutcome {
    pub record: IntakeRecord,
    pub streak: StreakAggregate,
    pub source: StreakSource,
}

/// Days taken in the 7 days ending today, against the weekly goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub taken_days: u8,
    pub goal: u8,
    pub goal_met: bool,
}

/// Result of comparing the stored aggregate with one rebuilt from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Stored aggregate, `None` when absent or unreadable.
    pub stored: Option<StreakAggregate>,
    pub recomputed: StreakAggregate,
    /// Whether the recomputed aggregate was written back.
    pub repaired: bool,
}

/// Habit tracker facade.
pub struct Tracker<S, N> {
    store: S,
    notifier: N,
    taken_title: String,
}

impl<S: KvStore, N: Notifier> Tracker<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            taken_title: DEFAULT_TAKEN_TITLE.to_string(),
        }
    }

    /// Override the title of the "taken" notification.
    pub fn with_taken_title(mut self, title: impl Into<String>) -> Self {
        self.taken_title = title.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn records(&self) -> RecordStore<&S> {
        RecordStore::new(&self.store)
    }

    fn settings_store(&self) -> SettingsStore<&S> {
        SettingsStore::new(&self.store)
    }

    /// Record today's outcome at the current local time.
    pub fn record_intake_for_today(
        &self,
        taken: bool,
        notes: Option<String>,
    ) -> Result<IntakeOutcome> {
        self.record_intake_at(local_now(), taken, notes)
    }

    /// Record the outcome for the calendar day of `now`, stamped with its time.
    pub fn record_intake_at(
        &self,
        now: NaiveDateTime,
        taken: bool,
        notes: Option<String>,
    ) -> Result<IntakeOutcome> {
        self.record_intake_for_date(now.date(), taken, notes, now)
    }

    /// Record (or edit) the outcome for `date`, which may lie in the past.
    ///
    /// A first record for today steps the stored aggregate forward; changing
    /// today's outcome or writing any other day rebuilds it from the full
    /// history.
    ///
    /// # Errors
    /// Rejects dates after today. Storage faults propagate and leave the
    /// previously stored history and aggregate untouched.
    pub fn record_intake_for_date(
        &self,
        date: NaiveDate,
        taken: bool,
        notes: Option<String>,
        now: NaiveDateTime,
    ) -> Result<IntakeOutcome> {
        let today = now.date();
        if date > today {
            return Err(ValidationError::FutureDate { date, today }.into());
        }
        let record = IntakeRecord::new(date, taken)
            .with_time(WallTime::from_time(now.time()))
            .with_notes(notes);
        self.write_record(record, today)
    }

    fn write_record(&self, record: IntakeRecord, today: NaiveDate) -> Result<IntakeOutcome> {
        let records = self.records();
        let mut history = records.get_all_records()?;
        let replaced = merge_record(&mut history, record.clone());

        let (streak, source) = if record.date != today {
            tracing::info!(date = %record.date, "backdated edit, recomputing streak");
            (recompute_from_history(&history), StreakSource::Recomputed)
        } else if replaced.is_some() {
            // The stored aggregate already counts the old outcome for today.
            tracing::info!(date = %record.date, "today's record changed, recomputing streak");
            (recompute_from_history(&history), StreakSource::Recomputed)
        } else {
            match self.stored_aggregate() {
                Ok(previous) => {
                    let next = update_streak(&previous.unwrap_or_default(), &record);
                    match next.check_invariants() {
                        Ok(()) => (next, StreakSource::Incremental),
                        Err(e) => {
                            tracing::warn!(error = %e, "incremental streak rejected, recomputing");
                            (recompute_from_history(&history), StreakSource::Recomputed)
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored streak unreadable, recomputing");
                    (recompute_from_history(&history), StreakSource::Recomputed)
                }
            }
        };

        let mut entries = records.history_entries(&history)?;
        entries.push((STREAK_DATA_KEY, encode_json(STREAK_DATA_KEY, &streak)?));
        self.store.set_many(&entries)?;
        tracing::debug!(
            date = %record.date,
            taken = record.taken,
            current_streak = streak.current_streak,
            ?source,
            "recorded intake"
        );

        if record.taken {
            let body = streak_message(streak.current_streak);
            if let Err(e) = self.notifier.send_immediate(&self.taken_title, &body) {
                tracing::warn!(error = %e, "streak notification not delivered");
            }
        }

        Ok(IntakeOutcome {
            record,
            streak,
            source,
        })
    }

    fn stored_aggregate(&self) -> Result<Option<StreakAggregate>, StorageError> {
        read_json(&self.store, STREAK_DATA_KEY)
    }

    /// Persisted aggregate, or the zero aggregate when absent or unreadable.
    pub fn streak(&self) -> StreakAggregate {
        or_default_logged(self.stored_aggregate().map(Option::unwrap_or_default), "streak")
    }

    /// Every stored record, newest-first; empty when unreadable.
    pub fn all_records(&self) -> Vec<IntakeRecord> {
        or_default_logged(self.records().get_all_records(), "intake history")
    }

    /// Whether today has a record marked taken.
    pub fn today_status(&self) -> bool {
        self.today_status_at(local_now().date())
    }

    pub fn today_status_at(&self, today: NaiveDate) -> bool {
        or_default_logged(self.records().get_record(today), "today's record")
            .is_some_and(|r| r.taken)
    }

    /// The last `days` calendar days ending today, most recent first.
    pub fn recent_history(&self, days: u32) -> Vec<IntakeRecord> {
        self.recent_history_at(local_now().date(), days)
    }

    /// Days without a stored record are filled with
    /// [`IntakeRecord::placeholder`]. `days` is capped at [`MAX_HISTORY_DAYS`].
    pub fn recent_history_at(&self, today: NaiveDate, days: u32) -> Vec<IntakeRecord> {
        let mut by_date: HashMap<NaiveDate, IntakeRecord> = self
            .all_records()
            .into_iter()
            .map(|r| (r.date, r))
            .collect();

        (0..u64::from(days.min(MAX_HISTORY_DAYS)))
            .map_while(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| {
                by_date
                    .remove(&date)
                    .unwrap_or_else(|| IntakeRecord::placeholder(date, today))
            })
            .collect()
    }

    /// Date to taken flag for every stored record.
    pub fn recorded_dates(&self) -> BTreeMap<NaiveDate, bool> {
        self.all_records()
            .into_iter()
            .map(|r| (r.date, r.taken))
            .collect()
    }

    pub fn weekly_progress_at(&self, today: NaiveDate) -> WeeklyProgress {
        let taken_days = self
            .recent_history_at(today, 7)
            .iter()
            .filter(|r| r.taken)
            .count() as u8;
        let goal = self.settings().weekly_goal;
        WeeklyProgress {
            taken_days,
            goal,
            goal_met: taken_days >= goal,
        }
    }

    /// Stored settings, or defaults when absent or unreadable.
    pub fn settings(&self) -> UserSettings {
        or_default_logged(self.settings_store().get(), "settings")
    }

    /// Validate and save settings, then re-sync the reminder schedule.
    ///
    /// Returns the time now scheduled, if any. Reminder failures are logged;
    /// the settings stay saved.
    pub fn update_settings(&self, settings: &UserSettings) -> Result<Option<WallTime>> {
        settings.validate()?;
        self.settings_store().save(settings)?;
        Ok(self.sync_reminder())
    }

    /// Apply the stored settings to the notifier.
    pub fn sync_reminder(&self) -> Option<WallTime> {
        match apply_reminder(&self.notifier, &self.settings()) {
            Ok(time) => time,
            Err(e) => {
                tracing::warn!(error = %e, "reminder schedule not updated");
                None
            }
        }
    }

    /// Rebuild the aggregate from history and write it back if it drifted.
    ///
    /// # Errors
    /// Fails when the history cannot be read or the repair cannot be written.
    pub fn reconcile(&self) -> Result<Reconciliation> {
        let history = self.records().get_all_records()?;
        let stored = match self.stored_aggregate() {
            Ok(stored) => stored,
            Err(e) if e.is_read_failure() => {
                tracing::warn!(error = %e, "stored streak unreadable");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let recomputed = recompute_from_history(&history);
        let in_sync = stored == Some(recomputed)
            || (stored.is_none() && history.is_empty());

        if !in_sync {
            self.store
                .set(STREAK_DATA_KEY, encode_json(STREAK_DATA_KEY, &recomputed)?)?;
            tracing::info!(
                current_streak = recomputed.current_streak,
                "streak repaired from history"
            );
        }

        Ok(Reconciliation {
            stored,
            recomputed,
            repaired: !in_sync,
        })
    }

    /// Delete all records, the aggregate and settings, then cancel reminders.
    ///
    /// Confirmation is the caller's job.
    pub fn reset(&self) -> Result<()> {
        self.records().clear_all()?;
        if let Err(e) = self.notifier.cancel_all() {
            tracing::warn!(error = %e, "reminders not cancelled after reset");
        }
        Ok(())
    }
}

fn or_default_logged<T: Default>(result: Result<T, StorageError>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to read {what}, using default");
        T::default()
    })
}
