//! In-memory stand-ins for the storage collaborators `sched-core` depends
//! on through its `DatasetLoader`/`SchedulePersister` traits. Production
//! deployments would back these with a real database; this crate exists so
//! the pipeline can be exercised end-to-end without one.

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sched_core::{CoreError, DatasetLoader, SchedulePersister};
use types::{DatasetBundle, DatasetId, ScheduleEntry};

/// Holds every seeded dataset plus its most recently persisted schedule.
/// Each dataset gets its own lock so that concurrent solves against
/// different datasets never contend.
#[derive(Default)]
pub struct MemStore {
    datasets: RwLock<HashMap<DatasetId, DatasetBundle>>,
    schedules: RwLock<HashMap<DatasetId, Vec<ScheduleEntry>>>,
    locks: RwLock<HashMap<DatasetId, Arc<Mutex<()>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `bundle` (id uniqueness, natural-key uniqueness on
    /// availability/preference/enrollment, dangling references) before
    /// inserting it, so a malformed dataset never silently overwrites a
    /// good one.
    pub fn seed(&self, bundle: DatasetBundle) -> Result<(), CoreError> {
        sched_core::validate(&bundle).map_err(|_| CoreError::DanglingReference)?;
        self.datasets.write().insert(bundle.dataset.id, bundle);
        Ok(())
    }

    pub fn schedule_for(&self, dataset_id: DatasetId) -> Option<Vec<ScheduleEntry>> {
        self.schedules.read().get(&dataset_id).cloned()
    }

    fn lock_for(&self, dataset_id: DatasetId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().get(&dataset_id) {
            return lock.clone();
        }
        self.locks
            .write()
            .entry(dataset_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl DatasetLoader for MemStore {
    async fn load(&self, dataset_id: DatasetId) -> Result<DatasetBundle, CoreError> {
        self.datasets
            .read()
            .get(&dataset_id)
            .cloned()
            .ok_or(CoreError::DatasetNotFound)
    }
}

#[async_trait]
impl SchedulePersister for MemStore {
    async fn replace_schedule(
        &self,
        dataset_id: DatasetId,
        entries: &[ScheduleEntry],
    ) -> Result<(), CoreError> {
        let lock = self.lock_for(dataset_id);
        let _guard = lock.lock();
        self.schedules
            .write()
            .insert(dataset_id, entries.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::minimal_bundle;

    #[tokio::test]
    async fn load_returns_not_found_for_unknown_dataset() {
        let store = MemStore::new();
        let err = store.load(DatasetId(99)).await.unwrap_err();
        assert!(matches!(err, CoreError::DatasetNotFound));
    }

    #[tokio::test]
    async fn replace_schedule_overwrites_previous_entries() {
        let store = MemStore::new();
        let bundle = minimal_bundle();
        let dataset_id = bundle.dataset.id;
        store.seed(bundle.clone()).unwrap();

        let entry = ScheduleEntry {
            dataset_id,
            class_id: bundle.classes[0].id,
            lecturer_id: bundle.lecturers[0].id,
            room_id: bundle.rooms[0].id,
            timeslot_id: bundle.timeslots[0].id,
            status: "simulated".into(),
            penalty: 0.0,
        };
        store.replace_schedule(dataset_id, &[entry.clone()]).await.unwrap();
        assert_eq!(store.schedule_for(dataset_id).unwrap().len(), 1);

        store.replace_schedule(dataset_id, &[]).await.unwrap();
        assert!(store.schedule_for(dataset_id).unwrap().is_empty());
    }

    #[test]
    fn seed_rejects_a_bundle_with_duplicate_preference_natural_keys() {
        let store = MemStore::new();
        let mut bundle = minimal_bundle();
        let dup = bundle.preferences[0].clone();
        bundle.preferences.push(dup);

        let err = store.seed(bundle).unwrap_err();
        assert!(matches!(err, CoreError::DanglingReference));
    }
}
