//! External schedule store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::models::{Constraint, Dataset, Faculty, Room, ScheduleEntry, Subject, TimeSlot};

/// Reference data source and schedule sink.
///
/// `replace_entries` has replace-all semantics: after a successful call the
/// store holds exactly the given entries. A failed call must leave the
/// previous entries visible.
pub trait ScheduleStore: Send + Sync {
    fn load_subjects(&self) -> Result<Vec<Subject>, StoreError>;

    fn load_faculty(&self) -> Result<Vec<Faculty>, StoreError>;

    fn load_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Stored slots. Empty means the run generates a grid from configuration.
    fn load_time_slots(&self) -> Result<Vec<TimeSlot>, StoreError>;

    fn load_constraints(&self) -> Result<Vec<Constraint>, StoreError>;

    fn replace_entries(&self, entries: &[ScheduleEntry]) -> Result<(), StoreError>;

    /// Loads every reference collection.
    fn load_dataset(&self) -> Result<Dataset, StoreError> {
        Ok(Dataset {
            subjects: self.load_subjects()?,
            faculty: self.load_faculty()?,
            rooms: self.load_rooms()?,
            time_slots: self.load_time_slots()?,
            constraints: self.load_constraints()?,
        })
    }
}

/// In-process store for embedding and tests.
///
/// Reads and writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    dataset: RwLock<Dataset>,
    entries: RwLock<Vec<ScheduleEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: RwLock::new(dataset),
            ..Self::default()
        }
    }

    /// Pre-populates stored entries.
    pub fn with_entries(self, entries: Vec<ScheduleEntry>) -> Self {
        *self.entries.write() = entries;
        self
    }

    /// Replaces the reference data.
    pub fn set_dataset(&self, dataset: Dataset) {
        *self.dataset.write() = dataset;
    }

    /// Currently stored entries.
    pub fn entries(&self) -> Vec<ScheduleEntry> {
        self.entries.read().clone()
    }

    /// Successful `replace_entries` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Makes every load fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Makes `replace_entries` fail with [`StoreError::WriteRejected`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn read<T>(&self, f: impl FnOnce(&Dataset) -> T) -> Result<T, StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("in-memory store offline".into()));
        }
        Ok(f(&self.dataset.read()))
    }
}

impl ScheduleStore for InMemoryStore {
    fn load_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        self.read(|d| d.subjects.clone())
    }

    fn load_faculty(&self) -> Result<Vec<Faculty>, StoreError> {
        self.read(|d| d.faculty.clone())
    }

    fn load_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.read(|d| d.rooms.clone())
    }

    fn load_time_slots(&self) -> Result<Vec<TimeSlot>, StoreError> {
        self.read(|d| d.time_slots.clone())
    }

    fn load_constraints(&self) -> Result<Vec<Constraint>, StoreError> {
        self.read(|d| d.constraints.clone())
    }

    fn replace_entries(&self, entries: &[ScheduleEntry]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::WriteRejected("in-memory store is read-only".into()));
        }
        *self.entries.write() = entries.to_vec();
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::tests::small_dataset;

    #[test]
    fn test_replace_all() {
        let data = small_dataset();
        let a = ScheduleEntry::new(&data.subjects[0], "F1", "R1", "MON-P1");
        let b = ScheduleEntry::new(&data.subjects[1], "F2", "L1", "MON-P2");
        let store = InMemoryStore::new(data).with_entries(vec![a.clone()]);

        store.replace_entries(&[b.clone()]).unwrap();
        assert_eq!(store.entries(), vec![b.clone()]);
        store.replace_entries(&[b.clone()]).unwrap();
        assert_eq!(store.entries(), vec![b]);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_failure_injection() {
        let data = small_dataset();
        let a = ScheduleEntry::new(&data.subjects[0], "F1", "R1", "MON-P1");
        let store = InMemoryStore::new(data).with_entries(vec![a.clone()]);

        store.fail_writes(true);
        assert!(matches!(store.replace_entries(&[]), Err(StoreError::WriteRejected(_))));
        assert_eq!(store.entries(), vec![a]);
        assert_eq!(store.write_count(), 0);

        store.fail_reads(true);
        assert!(matches!(store.load_dataset(), Err(StoreError::Unavailable(_))));
        store.fail_reads(false);
        assert_eq!(store.load_dataset().unwrap().subjects.len(), 2);
    }
}
