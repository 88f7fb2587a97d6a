//! # Key-Value Store Abstraction
//!
//! The cart persists one string under one key. Anything that can hold string
//! values by key and answer asynchronously can back it.
//!
//! ```text
//! ┌──────────────────────┐        ┌───────────────────────────┐
//! │  CartState           │        │  impl KeyValueStore       │
//! │  (gomarket-cart)     │──────► │  ├─ KeyValueRepository    │ SQLite file
//! │                      │  dyn   │  └─ MemoryKeyValueStore   │ process memory
//! └──────────────────────┘        └───────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::DbResult;

pub mod memory;

/// Asynchronous string key-value storage.
///
/// Implementations must be safe to share between tasks. A successful
/// `set_item` must be visible to every later `get_item` for the same key,
/// including after a restart for durable stores.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> DbResult<()>;
}
