//! Streak derivation.
//!
//! Two pure entry points produce a [`StreakAggregate`]:
//!
//! - [`update_streak`]: incremental step from the previous aggregate and one
//!   new record. Cheap, but only faithful when records arrive in date order.
//! - [`recompute_from_history`]: replays every record oldest-first through
//!   [`update_streak`]. This is the source of truth used after backdated
//!   edits and for reconciliation.
//!
//! Neither function touches storage; persisting the result is the caller's job.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::IntakeRecord;

/// Derived streak summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakAggregate {
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_days_taken: u32,
    #[serde(default)]
    pub last_taken_date: Option<NaiveDate>,
}

impl StreakAggregate {
    /// Check `best >= current` and `total >= current`.
    pub fn check_invariants(&self) -> Result<(), ValidationError> {
        if self.best_streak < self.current_streak {
            return Err(ValidationError::BrokenAggregate(format!(
                "best streak {} is below current streak {}",
                self.best_streak, self.current_streak
            )));
        }
        if self.total_days_taken < self.current_streak {
            return Err(ValidationError::BrokenAggregate(format!(
                "total days {} is below current streak {}",
                self.total_days_taken, self.current_streak
            )));
        }
        Ok(())
    }
}

/// Apply one new record to the previous aggregate.
///
/// Rules, in order:
/// 1. not taken: current streak drops to 0 and the last taken date is cleared
///    (best and total are kept), even when the record is for the last taken day.
/// 2. no last taken date: a fresh `1/1/1` aggregate on the record's date.
/// 3. same day as last taken: counts unchanged.
/// 4. the day after last taken: streak and total advance by one.
/// 5. anything else restarts the streak at 1 and counts one more day.
pub fn update_streak(previous: &StreakAggregate, record: &IntakeRecord) -> StreakAggregate {
    if !record.taken {
        return StreakAggregate {
            current_streak: 0,
            last_taken_date: None,
            ..*previous
        };
    }

    let Some(last) = previous.last_taken_date else {
        return StreakAggregate {
            current_streak: 1,
            best_streak: 1,
            total_days_taken: 1,
            last_taken_date: Some(record.date),
        };
    };

    if record.date == last {
        return StreakAggregate {
            best_streak: previous.best_streak.max(previous.current_streak),
            ..*previous
        };
    }

    if last.checked_add_days(Days::new(1)) == Some(record.date) {
        let current = previous.current_streak.saturating_add(1);
        return StreakAggregate {
            current_streak: current,
            best_streak: previous.best_streak.max(current),
            total_days_taken: previous.total_days_taken.saturating_add(1),
            last_taken_date: Some(record.date),
        };
    }

    StreakAggregate {
        current_streak: 1,
        best_streak: previous.best_streak.max(1),
        total_days_taken: previous.total_days_taken.saturating_add(1),
        last_taken_date: Some(record.date),
    }
}

/// Rebuild the aggregate from the full record history.
///
/// Input order does not matter; records are replayed oldest-first.
pub fn recompute_from_history(records: &[IntakeRecord]) -> StreakAggregate {
    let mut ordered: Vec<&IntakeRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.date);
    ordered
        .into_iter()
        .fold(StreakAggregate::default(), |agg, rec| update_streak(&agg, rec))
}
