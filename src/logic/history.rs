//! Bounded prediction history.
//!
//! The log keeps records newest first and never holds more than its capacity.
//! Persistence goes through the [`HistoryStore`] port so the log itself has no
//! idea whether it is backed by SQLite or by memory.

use crate::error::{CropCastError, Result};
use crate::models::{HistoryLocation, HistoryRecord, PredictionInput, PredictionResult};

pub const DEFAULT_CAPACITY: usize = 50;

/// Storage port for the history log.
pub trait HistoryStore {
    /// All stored records, newest first.
    fn load_history(&self) -> Result<Vec<HistoryRecord>>;

    /// Replace the stored records with `records`.
    fn save_history(&self, records: &[HistoryRecord]) -> Result<()>;
}

pub struct HistoryLog<S: HistoryStore> {
    store: S,
    records: Vec<HistoryRecord>,
    capacity: usize,
}

impl<S: HistoryStore> HistoryLog<S> {
    pub fn open(store: S, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut records = store.load_history()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if records.len() > capacity {
            tracing::debug!(
                stored = records.len(),
                capacity,
                "Trimming stored history to capacity"
            );
            records.truncate(capacity);
            store.save_history(&records)?;
        }

        Ok(Self {
            store,
            records,
            capacity,
        })
    }

    /// Append a prediction, evicting the oldest record when full.
    pub fn record(
        &mut self,
        input: PredictionInput,
        prediction: PredictionResult,
        location: Option<HistoryLocation>,
    ) -> Result<HistoryRecord> {
        let record = HistoryRecord::new(input, prediction, location);

        let mut updated = Vec::with_capacity(self.capacity);
        updated.push(record.clone());
        updated.extend(self.records.iter().take(self.capacity - 1).cloned());

        self.commit(updated)?;
        tracing::info!(id = %record.id, item = %record.input.item, "Prediction recorded");
        Ok(record)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(CropCastError::NotFound(format!("history record {}", id)));
        }

        let updated = self
            .records
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.commit(updated)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.commit(Vec::new())
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn commit(&mut self, updated: Vec<HistoryRecord>) -> Result<()> {
        self.store.save_history(&updated)?;
        self.records = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        saved: RefCell<Vec<HistoryRecord>>,
        fail_saves: bool,
    }

    impl HistoryStore for &MemoryStore {
        fn load_history(&self) -> Result<Vec<HistoryRecord>> {
            Ok(self.saved.borrow().clone())
        }

        fn save_history(&self, records: &[HistoryRecord]) -> Result<()> {
            if self.fail_saves {
                return Err(CropCastError::InvalidData("disk full".into()));
            }
            *self.saved.borrow_mut() = records.to_vec();
            Ok(())
        }
    }

    fn entry(year: i32) -> (PredictionInput, PredictionResult) {
        let input = PredictionInput::new(year, 750.0, 1.1, 19.0, "Kenya", "Maize");
        let result = PredictionResult::new(&input, 7200.0, Some(81));
        (input, result)
    }

    #[test]
    fn records_newest_first_and_persists() {
        let store = MemoryStore::default();
        let mut log = HistoryLog::open(&store, DEFAULT_CAPACITY).unwrap();

        let (i, r) = entry(2020);
        log.record(i, r, None).unwrap();
        let (i, r) = entry(2021);
        let newest = log.record(i, r, None).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].id, newest.id);
        assert_eq!(store.saved.borrow().len(), 2);
        assert_eq!(store.saved.borrow()[0].input.year, 2021);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = MemoryStore::default();
        let mut log = HistoryLog::open(&store, 3).unwrap();

        for year in 2000..2005 {
            let (i, r) = entry(year);
            log.record(i, r, None).unwrap();
        }

        let years: Vec<i32> = log.records().iter().map(|r| r.input.year).collect();
        assert_eq!(years, vec![2004, 2003, 2002]);
        assert_eq!(store.saved.borrow().len(), 3);
    }

    #[test]
    fn default_capacity_is_fifty() {
        let store = MemoryStore::default();
        let mut log = HistoryLog::open(&store, DEFAULT_CAPACITY).unwrap();
        for year in 1950..2010 {
            let (i, r) = entry(year);
            log.record(i, r, None).unwrap();
        }
        assert_eq!(log.len(), 50);
        assert_eq!(log.records()[0].input.year, 2009);
    }

    #[test]
    fn delete_and_clear() {
        let store = MemoryStore::default();
        let mut log = HistoryLog::open(&store, 10).unwrap();
        let (i, r) = entry(2020);
        let first = log.record(i, r, None).unwrap();
        let (i, r) = entry(2021);
        log.record(i, r, None).unwrap();

        log.delete(&first.id).unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.get(&first.id).is_none());
        assert!(matches!(
            log.delete(&first.id),
            Err(CropCastError::NotFound(_))
        ));

        log.clear().unwrap();
        assert!(log.is_empty());
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn reopening_restores_records() {
        let store = MemoryStore::default();
        {
            let mut log = HistoryLog::open(&store, 10).unwrap();
            let (i, r) = entry(2022);
            log.record(
                i,
                r,
                Some(HistoryLocation {
                    name: "Nairobi".into(),
                    country: "KE".into(),
                }),
            )
            .unwrap();
        }

        let log = HistoryLog::open(&store, 10).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].location_label(), "Nairobi, KE");
    }

    #[test]
    fn failed_save_leaves_log_unchanged() {
        let store = MemoryStore {
            fail_saves: true,
            ..Default::default()
        };
        let mut log = HistoryLog::open(&store, 10).unwrap();
        let (i, r) = entry(2020);
        assert!(log.record(i, r, None).is_err());
        assert!(log.is_empty());
    }
}
