//! Namespaced key-value boundary used to persist mood records.
//!
//! Every operation may suspend and may fail. Keys for mood records are
//! `"mood:" + id`; values are the serialized record text.

mod memory;

pub use memory::MemoryStore;

use std::future::Future;

pub const MOOD_KEY_PREFIX: &str = "mood:";

pub fn mood_key(id: &str) -> String {
    format!("{MOOD_KEY_PREFIX}{id}")
}

/// Failure at the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait KeyValueStore {
    /// Inserts or replaces the value stored under `key`.
    fn put(&self, key: &str, value: String) -> impl Future<Output = StoreResult<()>> + Send;

    /// Returns the full value under `key`, or `None` when absent.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Returns every key starting with `prefix`, in no particular order.
    fn list(&self, prefix: &str) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;
}
