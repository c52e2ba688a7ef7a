//! In-memory journey backed by a key-value store.
//!
//! The record list is kept newest first. Mutations touch the store first and
//! only update memory once the store call succeeded, so memory never runs
//! ahead of storage.

use std::cmp::Reverse;

use crate::error::JourneyResult;
use crate::models::MoodRecord;
use crate::store::{mood_key, KeyValueStore, MOOD_KEY_PREFIX};

const ENABLE_LOGS: bool = true;
use crate::{log_debug, log_info, log_warn};

pub struct MoodRepository<S> {
    store: S,
    records: Vec<MoodRecord>,
    selected: Option<String>,
}

impl<S: KeyValueStore> MoodRepository<S> {
    /// Empty repository. Call [`MoodRepository::load_all`] to populate it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
            selected: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the in-memory list with every decodable record in the store.
    ///
    /// Entries that fail to read or parse are dropped. If the key listing
    /// itself fails the journey is left empty and the error is returned.
    pub async fn load_all(&mut self) -> JourneyResult<&[MoodRecord]> {
        self.records.clear();
        self.selected = None;

        let keys = match self.store.list(MOOD_KEY_PREFIX).await {
            Ok(keys) => keys,
            Err(err) => {
                log_warn!("Could not list mood records, starting empty: {err}");
                return Err(err.into());
            }
        };

        let mut loaded = Vec::with_capacity(keys.len());
        for key in keys {
            let raw = match self.store.get(&key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    log_warn!("Skipping mood record {key}: read failed: {err}");
                    continue;
                }
            };
            match MoodRecord::from_json(&raw) {
                Ok(record) => loaded.push(record),
                Err(err) => log_warn!("Skipping mood record {key}: {err}"),
            }
        }

        loaded.sort_by_key(display_order);
        log_info!("Loaded {} mood records", loaded.len());
        self.records = loaded;
        Ok(&self.records)
    }

    /// Persists `record` and inserts it at its timestamp position.
    pub async fn create(&mut self, record: MoodRecord) -> JourneyResult<()> {
        let payload = record.to_json()?;
        self.store.put(&mood_key(record.id()), payload).await?;

        self.records.retain(|existing| existing.id() != record.id());
        let key = display_order(&record);
        let position = self
            .records
            .partition_point(|existing| display_order(existing) < key);
        log_info!("Created mood record {} at position {position}", record.id());
        self.records.insert(position, record);
        Ok(())
    }

    /// Deletes the record from the store, then from memory. Removing an
    /// unknown id succeeds and returns `None`.
    pub async fn remove(&mut self, id: &str) -> JourneyResult<Option<MoodRecord>> {
        self.store.delete(&mood_key(id)).await?;

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }

        let removed = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .map(|index| self.records.remove(index));
        match &removed {
            Some(_) => log_info!("Removed mood record {id}"),
            None => log_debug!("Mood record {id} was already absent"),
        }
        Ok(removed)
    }
}

impl<S> MoodRepository<S> {
    /// Newest first.
    pub fn records(&self) -> &[MoodRecord] {
        &self.records
    }

    /// Oldest first, the order the timeline and player consume.
    pub fn chronological(
        &self,
    ) -> impl DoubleEndedIterator<Item = &MoodRecord> + ExactSizeIterator + Clone + '_ {
        self.records.iter().rev()
    }

    pub fn get(&self, id: &str) -> Option<&MoodRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selects a loaded record. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&MoodRecord> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }
}

/// Newest first; equal timestamps fall back to id order so loads are stable.
fn display_order(record: &MoodRecord) -> (Reverse<i64>, String) {
    (Reverse(record.created_at()), record.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JourneyError;
    use crate::models::Color;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        offline: Arc<AtomicBool>,
    }

    impl FlakyStore {
        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn check(&self) -> StoreResult<()> {
            if self.offline.load(Ordering::SeqCst) {
                Err(StoreError::unavailable("backend offline"))
            } else {
                Ok(())
            }
        }
    }

    impl KeyValueStore for FlakyStore {
        async fn put(&self, key: &str, value: String) -> StoreResult<()> {
            self.check()?;
            self.inner.put(key, value).await
        }

        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.check()?;
            self.inner.get(key).await
        }

        async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
            self.check()?;
            self.inner.list(prefix).await
        }

        async fn delete(&self, key: &str) -> StoreResult<()> {
            self.check()?;
            self.inner.delete(key).await
        }
    }

    fn record_on(day: i64, colors: &[Color]) -> MoodRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::days(day);
        MoodRecord::new(vec![1, 2, 3], colors.to_vec(), 15, at)
    }

    fn days(repo: &MoodRepository<impl KeyValueStore>) -> Vec<i64> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap().timestamp_millis();
        repo.records()
            .iter()
            .map(|r| (r.created_at() - base) / 86_400_000)
            .collect()
    }

    #[tokio::test]
    async fn load_all_tolerates_empty_store() {
        let mut repo = MoodRepository::new(MemoryStore::new());
        assert!(repo.load_all().await.unwrap().is_empty());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn create_then_load_round_trips() {
        let store = MemoryStore::new();
        let record = record_on(0, &[Color::rgb(255, 0, 0)]);

        let mut repo = MoodRepository::new(store.clone());
        repo.create(record.clone()).await.unwrap();

        let mut fresh = MoodRepository::new(store);
        let loaded = fresh.load_all().await.unwrap();
        assert_eq!(loaded, &[record]);
    }

    #[tokio::test]
    async fn load_sorts_newest_first_and_skips_corrupt_entries() {
        let store = MemoryStore::new();
        for day in [2, 0, 1] {
            let record = record_on(day, &[]);
            store
                .put(&mood_key(record.id()), record.to_json().unwrap())
                .await
                .unwrap();
        }
        store.put("mood:broken", "{ nope".into()).await.unwrap();
        store.put("unrelated", "ignored".into()).await.unwrap();

        let mut repo = MoodRepository::new(store);
        repo.load_all().await.unwrap();
        assert_eq!(days(&repo), vec![2, 1, 0]);

        let chronological: Vec<i64> = repo.chronological().map(|r| r.created_at()).collect();
        assert!(chronological.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn create_inserts_by_timestamp() {
        let mut repo = MoodRepository::new(MemoryStore::new());
        repo.create(record_on(1, &[])).await.unwrap();
        repo.create(record_on(3, &[])).await.unwrap();
        repo.create(record_on(2, &[])).await.unwrap();
        repo.create(record_on(0, &[])).await.unwrap();
        assert_eq!(days(&repo), vec![3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn remove_is_idempotent_and_clears_selection() {
        let store = MemoryStore::new();
        let mut repo = MoodRepository::new(store.clone());
        let keep = record_on(0, &[]);
        let gone = record_on(1, &[]);
        repo.create(keep.clone()).await.unwrap();
        repo.create(gone.clone()).await.unwrap();

        assert!(repo.select(gone.id()));
        assert_eq!(repo.selected(), Some(&gone));

        let removed = repo.remove(gone.id()).await.unwrap();
        assert_eq!(removed, Some(gone.clone()));
        assert!(repo.selected().is_none());

        let again = repo.remove(gone.id()).await.unwrap();
        assert!(again.is_none());
        assert_eq!(repo.records(), &[keep]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn removing_other_record_keeps_selection() {
        let mut repo = MoodRepository::new(MemoryStore::new());
        let a = record_on(0, &[]);
        let b = record_on(1, &[]);
        repo.create(a.clone()).await.unwrap();
        repo.create(b.clone()).await.unwrap();
        repo.select(a.id());
        repo.remove(b.id()).await.unwrap();
        assert_eq!(repo.selected(), Some(&a));
        assert!(!repo.select("missing"));
        assert_eq!(repo.selected(), Some(&a));
    }

    #[tokio::test]
    async fn store_failures_leave_memory_untouched() {
        let store = FlakyStore::default();
        let mut repo = MoodRepository::new(store.clone());
        let existing = record_on(0, &[]);
        repo.create(existing.clone()).await.unwrap();

        store.set_offline(true);
        let err = repo.create(record_on(1, &[])).await.unwrap_err();
        assert!(matches!(err, JourneyError::Persistence(_)));
        let err = repo.remove(existing.id()).await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(repo.records(), &[existing.clone()]);

        store.set_offline(false);
        repo.remove(existing.id()).await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn load_failure_degrades_to_empty() {
        let store = FlakyStore::default();
        let mut repo = MoodRepository::new(store.clone());
        repo.create(record_on(0, &[])).await.unwrap();

        store.set_offline(true);
        assert!(repo.load_all().await.is_err());
        assert!(repo.is_empty());

        store.set_offline(false);
        assert_eq!(repo.load_all().await.unwrap().len(), 1);
    }
}
