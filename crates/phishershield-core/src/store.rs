//! Extension-local persistent key-value store
//!
//! Shared mutable pipeline state (scan cache, redirect records, alert data)
//! lives behind this trait. Each access is a read-modify-write against a
//! single well-known key, scoped per URL or per tab, so cross-tab races are
//! structurally avoided.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::Result;

/// Key for the URL → CacheEntry map.
pub const SCAN_CACHE_KEY: &str = "scanCache";
/// Key for the tab → RedirectRecord map.
pub const DETECTED_REDIRECTS_KEY: &str = "detectedRedirects";
/// Key for the singleton AlertData (last-write-wins).
pub const ALERT_DATA_KEY: &str = "phisherShieldAlertData";

/// Asynchronous key-value store of JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read a typed value, absorbing storage and decode failures as `None`.
///
/// Storage failure is never fatal to the pipeline: a failed read is a cache
/// miss / empty set and the caller proceeds degraded.
pub async fn read_key<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value failed to decode, treating as absent");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed, treating as absent");
            None
        }
    }
}

/// Write a typed value, absorbing storage failures.
pub async fn write_key<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, error = %e, "value failed to serialize, skipping write");
            return;
        }
    };
    if let Err(e) = store.set(key, json).await {
        tracing::warn!(key, error = %e, "storage write failed, pipeline proceeds unsynchronized");
    }
}

/// In-memory store for tests, the CLI, and single-process hosts.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// Store wrapper that fails every access. Test aid for the degraded path.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
use crate::error::ShieldError;

#[cfg(test)]
#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Err(ShieldError::Storage {
            key: key.to_string(),
            reason: "injected failure".to_string(),
        })
    }

    async fn set(&self, key: &str, _value: Value) -> Result<()> {
        Err(ShieldError::Storage {
            key: key.to_string(),
            reason: "injected failure".to_string(),
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        Err(ShieldError::Storage {
            key: key.to_string(),
            reason: "injected failure".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        store
            .set("k", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        let value = store.get("k").await.unwrap().unwrap();
        assert_eq!(value["a"], 1);

        store.remove("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_key_absorbs_storage_failure() {
        let store = FailingStore;
        let value: Option<HashMap<String, u32>> = read_key(&store, SCAN_CACHE_KEY).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_read_key_absorbs_decode_failure() {
        let store = MemoryStore::new();
        store
            .set("k", serde_json::json!("not a map"))
            .await
            .unwrap();
        let value: Option<HashMap<String, u32>> = read_key(&store, "k").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_write_key_absorbs_storage_failure() {
        let store = FailingStore;
        // Must not panic or propagate.
        write_key(&store, "k", &42u32).await;
    }
}
