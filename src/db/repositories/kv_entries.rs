use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::connection::Database;
use crate::store::{KeyValueStore, StoreResult};

impl Database {
    pub async fn put_entry(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to upsert entry {key}"))?;
            Ok(())
        })
        .await
    }

    pub async fn get_entry(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read entry {key}"))?;
            Ok(value)
        })
        .await
    }

    pub async fn list_entry_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_string();
        self.execute(move |conn| {
            // Case-sensitive prefix match.
            let mut stmt = conn.prepare(
                "SELECT key FROM kv_entries
                 WHERE substr(key, 1, length(?1)) = ?1",
            )?;

            let mut rows = stmt.query(params![prefix])?;
            let mut keys = Vec::new();
            while let Some(row) = rows.next()? {
                keys.push(row.get::<_, String>(0)?);
            }

            Ok(keys)
        })
        .await
    }

    /// Removing a missing key is not an error.
    pub async fn delete_entry(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
                .with_context(|| format!("failed to delete entry {key}"))?;
            Ok(())
        })
        .await
    }
}

impl KeyValueStore for Database {
    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        Ok(self.put_entry(key, value).await?)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.get_entry(key).await?)
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self.list_entry_keys(prefix).await?)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        Ok(self.delete_entry(key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_then_read_back() {
        let db = Database::open_in_memory().unwrap();
        db.put("mood:1", "first".into()).await.unwrap();
        db.put("mood:1", "second".into()).await.unwrap();

        assert_eq!(db.get("mood:1").await.unwrap().as_deref(), Some("second"));
        assert_eq!(db.get("mood:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_matches_literal_prefix_only() {
        let db = Database::open_in_memory().unwrap();
        db.put("mood:a", "1".into()).await.unwrap();
        db.put("mood:b", "2".into()).await.unwrap();
        db.put("moodXc", "3".into()).await.unwrap();
        db.put("settings", "4".into()).await.unwrap();

        let mut keys = db.list("mood:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["mood:a".to_string(), "mood:b".to_string()]);

        assert!(db.list("mood_").await.unwrap().is_empty());
        assert!(db.list("MOOD:").await.unwrap().is_empty());
        assert_eq!(db.list("").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.put("mood:a", "1".into()).await.unwrap();
        db.delete("mood:a").await.unwrap();
        db.delete("mood:a").await.unwrap();
        assert_eq!(db.get("mood:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_backed_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("journey.sqlite3");
        {
            let db = Database::new(path.clone()).unwrap();
            assert_eq!(db.path(), Some(path.as_path()));
            db.put("mood:keep", "value".into()).await.unwrap();
        }
        let db = Database::new(path).unwrap();
        assert_eq!(db.get("mood:keep").await.unwrap().as_deref(), Some("value"));
    }
}
