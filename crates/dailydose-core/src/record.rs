use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::WallTime;

/// One calendar day's logged outcome.
///
/// `date` is the unique key. `time` and `notes` are always serialized,
/// as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub date: NaiveDate,
    pub taken: bool,
    #[serde(default)]
    pub time: Option<WallTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl IntakeRecord {
    pub fn new(date: NaiveDate, taken: bool) -> Self {
        Self {
            date,
            taken,
            time: None,
            notes: None,
        }
    }

    pub fn with_time(mut self, time: WallTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Attach notes; blank text is stored as no notes.
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    /// Stand-in for a day with no stored record.
    ///
    /// A day still in progress carries `23:59`, a day that has passed `00:00`.
    pub fn placeholder(date: NaiveDate, today: NaiveDate) -> Self {
        let sentinel = if date == today {
            WallTime::END_OF_DAY
        } else {
            WallTime::MIDNIGHT
        };
        Self::new(date, false).with_time(sentinel)
    }
}

/// Sort newest-first by date.
pub fn sort_newest_first(records: &mut [IntakeRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Insert or replace `record` by date, keeping `history` newest-first.
///
/// Returns the record that was replaced, if the date was already present.
pub fn merge_record(
    history: &mut Vec<IntakeRecord>,
    record: IntakeRecord,
) -> Option<IntakeRecord> {
    let replaced = match history.iter_mut().find(|r| r.date == record.date) {
        Some(existing) => Some(std::mem::replace(existing, record)),
        None => {
            history.push(record);
            None
        }
    };
    sort_newest_first(history);
    replaced
}
