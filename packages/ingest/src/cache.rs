//! Process-wide cache of cleaned datasets.
//!
//! Cleaning several years of trips takes a while, and every analytics query
//! over the same range needs the same table. Entries are keyed by profile
//! name and year range and are immutable once inserted.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use bikeshare_trip_models::TripRecord;

/// Identifies one cleaned dataset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetKey {
    pub profile: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl DatasetKey {
    #[must_use]
    pub fn new(profile: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            profile: profile.into(),
            start_year,
            end_year,
        }
    }
}

/// Shared, read-only canonical tables.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<BTreeMap<DatasetKey, Arc<[TripRecord]>>>,
}

static SHARED: LazyLock<DatasetCache> = LazyLock::new(DatasetCache::default);

/// Returns the process-wide cache.
#[must_use]
pub fn shared_cache() -> &'static DatasetCache {
    &SHARED
}

impl DatasetCache {
    fn entries(&self) -> MutexGuard<'_, BTreeMap<DatasetKey, Arc<[TripRecord]>>> {
        // Entries are never left half-written, so a poisoned map is still valid.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn get(&self, key: &DatasetKey) -> Option<Arc<[TripRecord]>> {
        self.entries().get(key).cloned()
    }

    /// Stores `trips` under `key` unless an entry already exists, and returns
    /// the cached table.
    pub fn insert(&self, key: DatasetKey, trips: Vec<TripRecord>) -> Arc<[TripRecord]> {
        Arc::clone(self.entries().entry(key).or_insert_with(|| trips.into()))
    }

    /// Returns the cached table for `key`, building it with `load` on a miss.
    ///
    /// The lock is not held while `load` runs.
    ///
    /// # Errors
    ///
    /// Returns the error from `load`. Nothing is cached in that case.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: DatasetKey,
        load: impl FnOnce() -> Result<Vec<TripRecord>, E>,
    ) -> Result<Arc<[TripRecord]>, E> {
        if let Some(trips) = self.get(&key) {
            log::debug!("Dataset cache hit for {key:?}");
            return Ok(trips);
        }

        log::debug!("Dataset cache miss for {key:?}");
        let trips = load()?;
        Ok(self.insert(key, trips))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
