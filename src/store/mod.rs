//! Key-value store access.
//!
//! Handlers talk to the backing store through the [`KeyValueStore`] trait so
//! the Redis client can be swapped for the in-process [`MemoryStore`] when
//! running locally or under test.

mod memory;
mod redis;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, StoreBackend};

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Field-to-count mapping stored under a single hash key
pub type FieldMap = BTreeMap<String, i64>;

/// Errors returned by a key-value store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the command
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a value that is not an integer count
    #[error("malformed value in backing store: {0}")]
    Malformed(String),
}

/// Hash-oriented operations needed by the counter and readiness routes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn field_exists(&self, map: &str, field: &str) -> Result<bool, StoreError>;

    /// Add `amount` to a field, creating it at `amount` when missing.
    /// Returns the new value.
    async fn increment_field(&self, map: &str, field: &str, amount: i64)
        -> Result<i64, StoreError>;

    async fn set_field(&self, map: &str, field: &str, value: i64) -> Result<(), StoreError>;

    async fn get_all_fields(&self, map: &str) -> Result<FieldMap, StoreError>;

    async fn delete_field(&self, map: &str, field: &str) -> Result<(), StoreError>;

    /// Lightweight connectivity check
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Build the store selected in configuration.
///
/// The Redis backend connects lazily, so this succeeds even when Redis is down.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match config.store.backend {
        StoreBackend::Redis => Ok(Arc::new(RedisStore::new(&config.redis)?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_memory_backend() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Memory;
        let store = from_config(&config).unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[test]
    fn test_from_config_redis_backend_does_not_connect() {
        let mut config = AppConfig::default();
        config.redis.host = "redis.invalid".to_string();
        let store = from_config(&config).unwrap();
        assert_eq!(store.backend(), "redis");
    }
}
