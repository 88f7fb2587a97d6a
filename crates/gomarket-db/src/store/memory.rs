//! In-Memory Key-Value Store
//!
//! Provides in-memory storage for tests and development.
//! Data is lost when the process exits.
//!
//! Besides plain storage it can inject faults (failing reads or writes,
//! reads that hang until released) so callers can exercise their error paths
//! without a real disk.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::trace;

use super::KeyValueStore;
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    failing_reads: u32,
    failing_writes: u32,
    writes: u64,
}

/// In-memory key-value store.
///
/// Clones share the same underlying map, so a test can keep one handle for
/// inspection while the code under test owns another.
#[derive(Debug, Clone)]
pub struct MemoryKeyValueStore {
    state: Arc<RwLock<MemoryState>>,
    stall: Arc<watch::Sender<bool>>,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            stall: Arc::new(watch::Sender::new(false)),
        }
    }
}

impl MemoryKeyValueStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds the given entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            state: Arc::new(RwLock::new(MemoryState {
                entries,
                ..MemoryState::default()
            })),
            ..Self::default()
        }
    }

    /// Makes the next `count` calls to `set_item`/`remove_item` fail with
    /// [`DbError::Unavailable`]. Failed writes leave the stored value alone.
    pub async fn fail_next_writes(&self, count: u32) {
        self.state.write().await.failing_writes = count;
    }

    /// Makes the next `count` calls to `get_item` fail with
    /// [`DbError::Unavailable`].
    pub async fn fail_next_reads(&self, count: u32) {
        self.state.write().await.failing_reads = count;
    }

    /// While set, `get_item` hangs. Clearing it releases the waiting reads,
    /// which then see the entries as they are at that moment.
    pub async fn stall_reads(&self, stalled: bool) {
        self.stall.send_replace(stalled);
    }

    /// Reads a value without going through fault injection.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.state.read().await.entries.get(key).cloned()
    }

    /// Number of writes that reached the map.
    pub async fn write_count(&self) -> u64 {
        self.state.read().await.writes
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        {
            let mut state = self.state.write().await;
            if state.failing_reads > 0 {
                state.failing_reads -= 1;
                return Err(DbError::Unavailable(format!("read of {} failed", key)));
            }
        }

        let mut stall = self.stall.subscribe();
        let stalled = *stall.borrow();
        if stalled {
            trace!(key, "Read stalled");
            stall
                .wait_for(|stalled| !*stalled)
                .await
                .map_err(|e| DbError::Internal(e.to_string()))?;
        }

        Ok(self.state.read().await.entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        let mut state = self.state.write().await;
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(DbError::Unavailable(format!("write of {} failed", key)));
        }

        state.entries.insert(key.to_string(), value.to_string());
        state.writes += 1;
        trace!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        let mut state = self.state.write().await;
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(DbError::Unavailable(format!("remove of {} failed", key)));
        }

        state.entries.remove(key);
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryKeyValueStore::new();

        assert_eq!(store.get_item("k").await.unwrap(), None);

        store.set_item("k", "v1").await.unwrap();
        store.set_item("k", "v2").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v2"));

        store.remove_item("k").await.unwrap();
        store.remove_item("k").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
        assert_eq!(store.write_count().await, 4);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryKeyValueStore::with_entries([("k", "seeded")]);
        let other = store.clone();

        other.set_item("k", "changed").await.unwrap();

        assert_eq!(store.peek("k").await.as_deref(), Some("changed"));
    }

    #[tokio::test]
    async fn test_failed_writes_keep_previous_value() {
        let store = MemoryKeyValueStore::with_entries([("k", "old")]);
        store.fail_next_writes(1).await;

        let err = store.set_item("k", "new").await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)));
        assert_eq!(store.peek("k").await.as_deref(), Some("old"));

        store.set_item("k", "new").await.unwrap();
        assert_eq!(store.peek("k").await.as_deref(), Some("new"));
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_reads() {
        let store = MemoryKeyValueStore::with_entries([("k", "v")]);
        store.fail_next_reads(2).await;

        assert!(store.get_item("k").await.is_err());
        assert!(store.get_item("k").await.is_err());
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_stalled_reads_wait_for_release() {
        let store = MemoryKeyValueStore::with_entries([("k", "v")]);
        store.stall_reads(true).await;

        let result = tokio::time::timeout(Duration::from_millis(20), store.get_item("k")).await;
        assert!(result.is_err());

        let reader = store.clone();
        let pending = tokio::spawn(async move { reader.get_item("k").await });
        tokio::task::yield_now().await;
        store.set_item("k", "v2").await.unwrap();
        store.stall_reads(false).await;

        assert_eq!(pending.await.unwrap().unwrap().as_deref(), Some("v2"));
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("v2"));
    }
}
