use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use super::{KeyValueStore, StoreResult};

/// Process-local store. Nothing survives the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_list_delete() {
        let store = MemoryStore::new();
        store.put("mood:1", "a".into()).await.unwrap();
        store.put("mood:2", "b".into()).await.unwrap();
        store.put("other:1", "c".into()).await.unwrap();

        assert_eq!(store.get("mood:1").await.unwrap().as_deref(), Some("a"));
        assert_eq!(store.get("mood:9").await.unwrap(), None);

        let mut keys = store.list("mood:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["mood:1".to_string(), "mood:2".to_string()]);

        store.delete("mood:1").await.unwrap();
        store.delete("mood:1").await.unwrap();
        assert_eq!(store.get("mood:1").await.unwrap(), None);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn put_replaces_existing_value() {
        let store = MemoryStore::new();
        store.put("mood:1", "old".into()).await.unwrap();
        store.put("mood:1", "new".into()).await.unwrap();
        assert_eq!(store.get("mood:1").await.unwrap().as_deref(), Some("new"));
        assert_eq!(store.len().await, 1);
    }
}
