//! Integration tests for the tracker facade over real and faulty stores.

use std::cell::Cell;

use chrono::{NaiveDate, NaiveDateTime};
use dailydose_core::storage::{INTAKE_HISTORY_KEY, STREAK_DATA_KEY};
use dailydose_core::{
    CoreError, Database, KvStore, RecordingNotifier, StorageError, StreakAggregate, Tracker,
    UserSettings, WallTime,
};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(date: &str, hh: u32, mm: u32) -> NaiveDateTime {
    d(date).and_hms_opt(hh, mm, 0).unwrap()
}

fn agg(current: u32, best: u32, total: u32, last: Option<&str>) -> StreakAggregate {
    StreakAggregate {
        current_streak: current,
        best_streak: best,
        total_days_taken: total,
        last_taken_date: last.map(d),
    }
}

/// Wraps a database and fails reads or writes on demand.
struct FlakyStore {
    inner: Database,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: Database::open_memory().unwrap(),
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
        }
    }
}

impl KvStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: "injected".into(),
            });
        }
        self.inner.get(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::WriteFailed {
                keys: entries.iter().map(|(k, _)| k.to_string()).collect(),
                message: "injected".into(),
            });
        }
        self.inner.set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::WriteFailed {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                message: "injected".into(),
            });
        }
        self.inner.remove_many(keys)
    }
}

#[test]
fn scenario_walk_through_streak_transitions() {
    let db = Database::open_memory().unwrap();
    let tracker = Tracker::new(&db, RecordingNotifier::new());

    let first = tracker.record_intake_at(at("2024-01-01", 9, 0), true, None).unwrap();
    assert_eq!(first.streak, agg(1, 1, 1, Some("2024-01-01")));

    let second = tracker.record_intake_at(at("2024-01-02", 9, 0), true, None).unwrap();
    assert_eq!(second.streak, agg(2, 2, 2, Some("2024-01-02")));

    // Flipping today to missed withdraws the 2nd from every count.
    let missed = tracker.record_intake_at(at("2024-01-02", 21, 0), false, None).unwrap();
    assert_eq!(missed.streak, agg(0, 1, 1, None));
    assert!(!tracker.reconcile().unwrap().repaired);
    assert!(!tracker.today_status_at(d("2024-01-02")));
    assert_eq!(tracker.all_records().len(), 2);
}

#[test]
fn gap_restarts_streak_through_facade() {
    let db = Database::open_memory().unwrap();
    let tracker = Tracker::new(&db, RecordingNotifier::new());
    tracker.record_intake_at(at("2024-01-01", 9, 0), true, None).unwrap();
    tracker.record_intake_at(at("2024-01-02", 9, 0), true, None).unwrap();
    let after_gap = tracker.record_intake_at(at("2024-01-05", 9, 0), true, None).unwrap();
    assert_eq!(after_gap.streak, agg(1, 2, 3, Some("2024-01-05")));
}

#[test]
fn state_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dailydose.db");
    {
        let db = Database::open_at(&path).unwrap();
        let tracker = Tracker::new(&db, RecordingNotifier::new());
        tracker
            .record_intake_at(at("2024-06-01", 7, 5), true, Some("first".into()))
            .unwrap();
        tracker
            .update_settings(&UserSettings {
                reminder_time: "06:45".into(),
                notifications_enabled: true,
                weekly_goal: 6,
            })
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let tracker = Tracker::new(&db, RecordingNotifier::new());
    assert_eq!(tracker.streak(), agg(1, 1, 1, Some("2024-06-01")));
    assert_eq!(tracker.settings().reminder_time, "06:45");
    let history = tracker.recent_history_at(d("2024-06-01"), 1);
    assert_eq!(history[0].time, WallTime::new(7, 5));
    assert_eq!(history[0].notes.as_deref(), Some("first"));
}

#[test]
fn persisted_layout_uses_documented_keys() {
    let db = Database::open_memory().unwrap();
    let tracker = Tracker::new(&db, RecordingNotifier::new());
    tracker.record_intake_at(at("2024-01-01", 9, 0), true, None).unwrap();

    let history: serde_json::Value =
        serde_json::from_str(&db.get(INTAKE_HISTORY_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(history[0]["date"], "2024-01-01");
    assert_eq!(history[0]["time"], "09:00");
    assert!(history[0]["notes"].is_null());

    let streak: serde_json::Value =
        serde_json::from_str(&db.get(STREAK_DATA_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(streak["currentStreak"], 1);
    assert_eq!(streak["lastTakenDate"], "2024-01-01");
}

#[test]
fn write_failure_propagates_and_changes_nothing() {
    let store = FlakyStore::new();
    let tracker = Tracker::new(&store, RecordingNotifier::new());
    tracker.record_intake_at(at("2024-01-01", 9, 0), true, None).unwrap();

    store.fail_writes.set(true);
    let err = tracker
        .record_intake_at(at("2024-01-02", 9, 0), true, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::Storage(StorageError::WriteFailed { .. })));

    store.fail_writes.set(false);
    assert_eq!(tracker.all_records().len(), 1);
    assert_eq!(tracker.streak(), agg(1, 1, 1, Some("2024-01-01")));
    // Only the first, successful write was announced.
    assert_eq!(tracker.notifier().calls().len(), 1);
}

#[test]
fn read_failures_fall_back_to_defaults() {
    let store = FlakyStore::new();
    let tracker = Tracker::new(&store, RecordingNotifier::new());
    tracker.record_intake_at(at("2024-01-01", 9, 0), true, None).unwrap();

    store.fail_reads.set(true);
    assert!(tracker.all_records().is_empty());
    assert_eq!(tracker.streak(), StreakAggregate::default());
    assert_eq!(tracker.settings(), UserSettings::default());
    assert!(!tracker.today_status_at(d("2024-01-01")));
    let placeholders = tracker.recent_history_at(d("2024-01-01"), 7);
    assert_eq!(placeholders.len(), 7);
    assert!(placeholders.iter().all(|r| !r.taken));

    // Writes must not proceed on top of an unreadable history.
    assert!(tracker
        .record_intake_at(at("2024-01-02", 9, 0), true, None)
        .is_err());
    assert!(tracker.reconcile().is_err());
}

#[test]
fn reset_failure_is_reported() {
    let store = FlakyStore::new();
    let tracker = Tracker::new(&store, RecordingNotifier::new());
    tracker.record_intake_at(at("2024-01-01", 9, 0), true, None).unwrap();

    store.fail_writes.set(true);
    assert!(tracker.reset().is_err());
    store.fail_writes.set(false);
    assert_eq!(tracker.all_records().len(), 1);
}

#[test]
fn editing_past_day_to_missed_splits_the_streak() {
    let db = Database::open_memory().unwrap();
    let tracker = Tracker::new(&db, RecordingNotifier::new());
    for day in ["2024-02-01", "2024-02-02", "2024-02-03", "2024-02-04"] {
        let date = d(day);
        tracker
            .record_intake_for_date(date, true, None, date.and_hms_opt(9, 0, 0).unwrap())
            .unwrap();
    }
    assert_eq!(tracker.streak(), agg(4, 4, 4, Some("2024-02-04")));

    let outcome = tracker
        .record_intake_for_date(d("2024-02-02"), false, None, at("2024-02-04", 18, 0))
        .unwrap();
    // 01 -> 1 ; 02 missed -> 0 ; 03,04 start a fresh run of 2
    assert_eq!(outcome.streak.current_streak, 2);
    assert_eq!(outcome.streak.last_taken_date, Some(d("2024-02-04")));
    assert!(outcome.streak.check_invariants().is_ok());
    assert!(!tracker.recorded_dates()[&d("2024-02-02")]);
}
