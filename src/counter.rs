//! Per-host visit counter kept in the key-value store.

use crate::config::HOSTS_KEY;
use crate::store::{FieldMap, KeyValueStore, StoreError};

/// Count one visit for `host` and return every host's count.
///
/// Without `atomic` this is an exists-then-write pair, so two processes
/// counting the same host at once can lose an increment.
pub async fn record_visit(
    store: &dyn KeyValueStore,
    host: &str,
    atomic: bool,
) -> Result<FieldMap, StoreError> {
    if atomic {
        store.increment_field(HOSTS_KEY, host, 1).await?;
    } else if store.field_exists(HOSTS_KEY, host).await? {
        store.increment_field(HOSTS_KEY, host, 1).await?;
    } else {
        store.set_field(HOSTS_KEY, host, 1).await?;
    }

    store.get_all_fields(HOSTS_KEY).await
}

/// Delete every host's count one field at a time and return what is left.
///
/// Stops at the first store error; fields deleted before it stay deleted.
pub async fn reset(store: &dyn KeyValueStore) -> Result<FieldMap, StoreError> {
    let hosts = store.get_all_fields(HOSTS_KEY).await?;
    for host in hosts.keys() {
        store.delete_field(HOSTS_KEY, host).await?;
    }
    tracing::info!(cleared = hosts.len(), "Reset host counters");

    store.get_all_fields(HOSTS_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_first_visit_initializes_to_one() {
        let store = MemoryStore::new();
        let counts = record_visit(&store, "pod-a", false).await.unwrap();
        assert_eq!(counts.get("pod-a"), Some(&1));
        assert_eq!(counts.len(), 1);
    }

    #[tokio::test]
    async fn test_counts_are_per_host() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            record_visit(&store, "pod-a", false).await.unwrap();
        }
        let counts = record_visit(&store, "pod-b", true).await.unwrap();
        assert_eq!(counts.get("pod-a"), Some(&3));
        assert_eq!(counts.get("pod-b"), Some(&1));
    }

    #[tokio::test]
    async fn test_atomic_and_checked_paths_agree() {
        let checked = MemoryStore::new();
        let atomic = MemoryStore::new();
        for _ in 0..5 {
            record_visit(&checked, "pod-a", false).await.unwrap();
            record_visit(&atomic, "pod-a", true).await.unwrap();
        }
        assert_eq!(
            checked.get_all_fields(HOSTS_KEY).await.unwrap(),
            atomic.get_all_fields(HOSTS_KEY).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_reset_clears_all_hosts() {
        let store = MemoryStore::new();
        record_visit(&store, "pod-a", false).await.unwrap();
        record_visit(&store, "pod-b", false).await.unwrap();

        assert!(reset(&store).await.unwrap().is_empty());
        // Resetting an empty map is fine
        assert!(reset(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_propagates() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(
            record_visit(&store, "pod-a", false).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(reset(&store).await.is_err());
    }

    #[tokio::test]
    async fn test_reset_interrupted_keeps_earlier_deletes() {
        let store = MemoryStore::new();
        for host in ["pod-a", "pod-b", "pod-c"] {
            record_visit(&store, host, false).await.unwrap();
        }
        store.fail_deletes_after(1);

        assert!(matches!(reset(&store).await, Err(StoreError::Unavailable(_))));

        // Hosts are deleted in key order; only the first went through
        let left = store.get_all_fields(HOSTS_KEY).await.unwrap();
        assert!(!left.contains_key("pod-a"));
        assert_eq!(left.get("pod-b"), Some(&1));
        assert_eq!(left.get("pod-c"), Some(&1));
    }
}
