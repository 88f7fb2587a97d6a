//! # Snapshot Persistence
//!
//! Reads and writes the cart snapshot under one key of a [`KeyValueStore`].
//!
//! ```text
//! write(products)
//!    │
//!    ▼
//! serde_json::to_string ──► set_item(key, json)
//!                              │
//!                     ok ◄─────┤
//!                              │ transient error, retries left
//!                              ▼
//!                       sleep(next backoff) ──► set_item(key, json) ...
//! ```

use std::sync::Arc;

use backoff::backoff::Backoff;
use gomarket_core::{Cart, CoreError, LineItem};
use gomarket_db::KeyValueStore;
use tracing::{debug, error, warn};

use crate::config::PersistenceSettings;
use crate::error::{CartError, CartResult};

/// Binds a store, a key and a retry policy together.
pub(crate) struct Persister {
    store: Arc<dyn KeyValueStore>,
    key: String,
    settings: PersistenceSettings,
}

impl Persister {
    pub(crate) fn new(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        settings: PersistenceSettings,
    ) -> Self {
        Persister {
            store,
            key: key.into(),
            settings,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    /// Reads the raw stored snapshot.
    pub(crate) async fn load(&self) -> CartResult<Option<String>> {
        self.store.get_item(&self.key).await.map_err(|e| {
            error!(key = %self.key, error = %e, "Failed to read stored cart");
            CartError::Storage(e)
        })
    }

    /// Writes `products` as the full snapshot, retrying transient failures.
    pub(crate) async fn write(&self, products: &[LineItem]) -> CartResult<()> {
        let payload = encode(products)?;
        let mut backoff = self.settings.backoff();
        let mut attempt = 0u32;

        loop {
            let err = match self.store.set_item(&self.key, &payload).await {
                Ok(()) => {
                    debug!(key = %self.key, items = products.len(), attempt, "Cart persisted");
                    return Ok(());
                }
                Err(e) => e,
            };

            if attempt >= self.settings.max_retries || !err.is_transient() {
                error!(key = %self.key, error = %err, attempt, "Failed to persist cart");
                return Err(CartError::Storage(err));
            }

            let Some(delay) = backoff.next_backoff() else {
                error!(key = %self.key, error = %err, "Persist backoff exhausted");
                return Err(CartError::Storage(err));
            };

            attempt += 1;
            warn!(
                key = %self.key,
                error = %err,
                attempt,
                max_retries = self.settings.max_retries,
                ?delay,
                "Cart write failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Serializes products as the stored JSON array.
pub(crate) fn encode(products: &[LineItem]) -> CartResult<String> {
    serde_json::to_string(products).map_err(|e| CartError::Encode(e.to_string()))
}

/// Parses a stored JSON array back into a cart, keeping order and quantities.
pub(crate) fn decode(raw: &str) -> CartResult<Cart> {
    let items: Vec<LineItem> =
        serde_json::from_str(raw).map_err(|e| CartError::CorruptSnapshot(e.to_string()))?;

    Cart::from_items(items).map_err(|e| match e {
        CoreError::DuplicateLineItem(_) => CartError::CorruptSnapshot(e.to_string()),
        other => CartError::InvalidItem(other),
    })
}
