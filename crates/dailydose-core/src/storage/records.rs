//! Intake record history keyed by calendar date.

use chrono::{NaiveDate, Utc};

use super::{encode_json, read_json, KvStore, ALL_KEYS, INTAKE_HISTORY_KEY, LAST_UPDATED_KEY};
use crate::error::StorageError;
use crate::record::{merge_record, sort_newest_first, IntakeRecord};

/// Date-keyed record collection stored as one newest-first JSON array.
pub struct RecordStore<S> {
    store: S,
}

impl<S: KvStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All records, newest-first. Empty when nothing has been stored yet.
    ///
    /// # Errors
    /// Read faults and undecodable history are returned to the caller.
    pub fn get_all_records(&self) -> Result<Vec<IntakeRecord>, StorageError> {
        let mut records: Vec<IntakeRecord> =
            read_json(&self.store, INTAKE_HISTORY_KEY)?.unwrap_or_default();
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Exact-date lookup.
    pub fn get_record(&self, date: NaiveDate) -> Result<Option<IntakeRecord>, StorageError> {
        Ok(self
            .get_all_records()?
            .into_iter()
            .find(|r| r.date == date))
    }

    /// Insert or replace `record` by date and persist the re-sorted history.
    ///
    /// # Errors
    /// Write faults propagate; the stored history is unchanged on error.
    pub fn upsert_record(&self, record: IntakeRecord) -> Result<Vec<IntakeRecord>, StorageError> {
        let history = self.merged_history(record)?;
        self.store.set_many(&self.history_entries(&history)?)?;
        tracing::debug!(records = history.len(), "saved intake history");
        Ok(history)
    }

    /// The history as it would look after upserting `record`, without writing it.
    pub fn merged_history(&self, record: IntakeRecord) -> Result<Vec<IntakeRecord>, StorageError> {
        let mut history = self.get_all_records()?;
        merge_record(&mut history, record);
        Ok(history)
    }

    /// Encoded key-value entries for persisting `history`, including the
    /// `last_updated` stamp. Lets callers batch them with other writes.
    pub fn history_entries(
        &self,
        history: &[IntakeRecord],
    ) -> Result<Vec<(&'static str, String)>, StorageError> {
        Ok(vec![
            (INTAKE_HISTORY_KEY, encode_json(INTAKE_HISTORY_KEY, &history)?),
            (LAST_UPDATED_KEY, Utc::now().to_rfc3339()),
        ])
    }

    /// Time of the last history write, if any.
    pub fn last_updated(&self) -> Result<Option<String>, StorageError> {
        self.store.get(LAST_UPDATED_KEY)
    }

    /// Irrevocably delete records, aggregate, settings and the update stamp.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.store.remove_many(&ALL_KEYS)?;
        tracing::info!("cleared all tracker data");
        Ok(())
    }
}
