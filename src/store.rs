// src/store.rs
//! JSON key-value store.
//!
//! Each value is serialized to JSON and kept as one row of the `kv_store`
//! table. Callers always read a whole value, change it in memory and write it
//! back; there is no partial update and no transaction across keys.

use crate::error::{AppError, AppResult};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;

pub mod keys {
    pub const USERS: &str = "mock_db_users";
    pub const STUDENTS: &str = "mock_db_students";
    pub const VIOLATION_TYPES: &str = "mock_db_violation_types";
    pub const VIOLATIONS: &str = "mock_db_violations";
    pub const CURRENT_USER_TOKEN: &str = "mock_db_current_user_token";
    pub const SIGNATURE_NAMES: &str = "spps_signature_names";
}

#[derive(Debug, Clone)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads the value under `key`. A missing key, a storage failure or a
    /// value that no longer decodes all yield `default`; the latter two are
    /// logged.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await;

        let raw = match raw {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::error!("Error loading state from {}: {:?}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Error decoding state from {}: {}", key, e);
                default
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| {
            tracing::error!("Error encoding state for {}: {}", key, e);
            AppError::from(e)
        })?;

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            "#,
        )
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Error saving state to {}: {:?}", key, e);
            AppError::from(e)
        })?;

        Ok(())
    }

    /// Removing a key that was never saved is not an error.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Error removing state {}: {:?}", key, e);
                AppError::from(e)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        tags: Vec<String>,
        count: Option<u32>,
    }

    #[tokio::test]
    async fn saved_value_loads_back_equal() {
        let store = KvStore::new(create_memory_pool().await.unwrap());
        let value = vec![
            Sample { name: "a".into(), tags: vec!["x".into(), "y".into()], count: Some(2) },
            Sample { name: "b".into(), tags: vec![], count: None },
        ];

        store.save("samples", &value).await.unwrap();
        let loaded: Vec<Sample> = store.load("samples", Vec::new()).await;

        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn missing_key_returns_default() {
        let store = KvStore::new(create_memory_pool().await.unwrap());
        let loaded: Option<String> = store.load("nothing-here", Some("fallback".into())).await;
        assert_eq!(loaded.as_deref(), Some("fallback"));
    }

    #[tokio::test]
    async fn undecodable_value_falls_back_to_default() {
        let store = KvStore::new(create_memory_pool().await.unwrap());
        store.save("numbers", "not a list").await.unwrap();

        let loaded: Vec<u32> = store.load("numbers", vec![7]).await;
        assert_eq!(loaded, vec![7]);
    }

    #[tokio::test]
    async fn save_overwrites_and_remove_deletes() {
        let store = KvStore::new(create_memory_pool().await.unwrap());
        store.save("token", "first").await.unwrap();
        store.save("token", "second").await.unwrap();
        assert_eq!(store.load::<Option<String>>("token", None).await.as_deref(), Some("second"));

        store.remove("token").await.unwrap();
        store.remove("token").await.unwrap();
        assert_eq!(store.load::<Option<String>>("token", None).await, None);
    }
}
