//! In-process key-value store.
//!
//! Used for running the service without Redis and for tests. An outage can be
//! simulated with [`MemoryStore::set_available`], and a store that dies
//! partway through a reset with [`MemoryStore::fail_deletes_after`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{FieldMap, KeyValueStore, StoreError};

pub struct MemoryStore {
    maps: Mutex<HashMap<String, FieldMap>>,
    available: AtomicBool,
    /// Deletes still allowed before they start failing; `usize::MAX` is unlimited
    deletes_left: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            maps: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            deletes_left: AtomicUsize::new(usize::MAX),
        }
    }

    /// Toggle simulated reachability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Let `count` more deletes succeed, then fail every delete after them.
    pub fn fail_deletes_after(&self, count: usize) {
        self.deletes_left.store(count, Ordering::SeqCst);
    }

    fn take_delete(&self) -> Result<(), StoreError> {
        self.deletes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(left),
                left => Some(left - 1),
            })
            .map(|_| ())
            .map_err(|_| StoreError::Unavailable("memory store delete failed".to_string()))
    }

    fn maps(&self) -> Result<MutexGuard<'_, HashMap<String, FieldMap>>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        self.maps
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("memory store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn field_exists(&self, map: &str, field: &str) -> Result<bool, StoreError> {
        let maps = self.maps()?;
        Ok(maps.get(map).is_some_and(|fields| fields.contains_key(field)))
    }

    async fn increment_field(
        &self,
        map: &str,
        field: &str,
        amount: i64,
    ) -> Result<i64, StoreError> {
        let mut maps = self.maps()?;
        let value = maps
            .entry(map.to_string())
            .or_default()
            .entry(field.to_string())
            .or_insert(0);
        *value += amount;
        Ok(*value)
    }

    async fn set_field(&self, map: &str, field: &str, value: i64) -> Result<(), StoreError> {
        let mut maps = self.maps()?;
        maps.entry(map.to_string())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    async fn get_all_fields(&self, map: &str) -> Result<FieldMap, StoreError> {
        let maps = self.maps()?;
        Ok(maps.get(map).cloned().unwrap_or_default())
    }

    async fn delete_field(&self, map: &str, field: &str) -> Result<(), StoreError> {
        let mut maps = self.maps()?;
        self.take_delete()?;
        if let Some(fields) = maps.get_mut(map) {
            fields.remove(field);
            // Redis drops a hash once its last field is gone
            if fields.is_empty() {
                maps.remove(map);
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.maps().map(|_| ())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_increment_creates_missing_field() {
        let store = MemoryStore::new();
        assert_eq!(store.increment_field("hosts", "a", 1).await.unwrap(), 1);
        assert_eq!(store.increment_field("hosts", "a", 4).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_set_exists_delete() {
        let store = MemoryStore::new();
        assert!(!store.field_exists("hosts", "a").await.unwrap());

        store.set_field("hosts", "a", 1).await.unwrap();
        assert!(store.field_exists("hosts", "a").await.unwrap());
        assert!(!store.field_exists("other", "a").await.unwrap());

        store.delete_field("hosts", "a").await.unwrap();
        assert!(!store.field_exists("hosts", "a").await.unwrap());
        // Deleting a missing field is not an error
        store.delete_field("hosts", "a").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_all_fields_on_missing_map_is_empty() {
        let store = MemoryStore::new();
        assert!(store.get_all_fields("hosts").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let store = MemoryStore::new();
        store.set_field("hosts", "a", 3).await.unwrap();
        store.set_available(false);

        assert!(matches!(store.ping().await, Err(StoreError::Unavailable(_))));
        assert!(store.field_exists("hosts", "a").await.is_err());
        assert!(store.get_all_fields("hosts").await.is_err());

        // Data survives the simulated outage
        store.set_available(true);
        assert_eq!(store.get_all_fields("hosts").await.unwrap().get("a"), Some(&3));
    }

    #[tokio::test]
    async fn test_deletes_fail_after_limit() {
        let store = MemoryStore::new();
        for field in ["a", "b", "c"] {
            store.set_field("hosts", field, 1).await.unwrap();
        }
        store.fail_deletes_after(1);

        store.delete_field("hosts", "a").await.unwrap();
        assert!(store.delete_field("hosts", "b").await.is_err());
        assert!(store.delete_field("hosts", "c").await.is_err());

        // Reads are unaffected
        let fields = store.get_all_fields("hosts").await.unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["b", "c"]);
    }
}
