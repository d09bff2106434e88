use crate::{
    error::{BoardError, Result},
    storage::KeyValueStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process key-value storage with an optional size quota.
///
/// Mirrors browser local storage: a write that would push the total stored
/// bytes (keys plus values) past the quota fails and leaves the previous
/// value in place.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| BoardError::Persistence("Storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(BoardError::Persistence(format!(
                    "Quota exceeded: {} of {} bytes",
                    needed, quota
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("k").await.unwrap(), None);
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quota_exceeded_keeps_previous_value() {
        let storage = MemoryStorage::with_quota(10);

        storage.set("k", "12345").await.unwrap();
        let result = storage.set("k", "0123456789").await;

        assert!(matches!(result, Err(BoardError::Persistence(_))));
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_quota_replacing_value_does_not_double_count() {
        let storage = MemoryStorage::with_quota(10);

        storage.set("k", "123456789").await.unwrap();
        storage.set("k", "987654321").await.unwrap();

        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("987654321"));
    }
}
