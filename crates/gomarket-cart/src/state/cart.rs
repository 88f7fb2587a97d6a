//! # Cart State
//!
//! The single source of truth for the session's cart, kept in sync with the
//! device store.
//!
//! ## Thread Safety
//! The cart sits behind a `tokio::sync::Mutex` that every mutation holds
//! across compute, publish and persist. Two quick taps therefore never build
//! on the same stale list, and their writes reach the store in tap order.
//! Readers never touch the mutex: they read the latest [`CartSnapshot`] from
//! a `watch` channel.
//!
//! Hydration reads the store without the lock and only takes it to swap the
//! restored cart in, so a slow or hung store never holds up a tap. If a
//! mutation lands while the read is in flight, the in-memory cart wins.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_to_cart(item) ──┐                                                  │
//! │  increment(id) ──────┼──► lock ──► Cart rule ──► publish ──► persist    │
//! │  decrement(id) ──────┘      │          │            │           │       │
//! │                             │          │            ▼           ▼       │
//! │                             │          │     watch::Sender  set_item    │
//! │                             │          │     (revision+1)   (new JSON)  │
//! │                             │          ▼                                │
//! │                             │   unknown id ──► return current snapshot  │
//! │                             ▼                                           │
//! │  products() / snapshot() / subscribe()  ◄── read watch, no lock         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use gomarket_core::validation::{validate_new_line_item, validate_storage_key};
use gomarket_core::{Cart, LineItem, NewLineItem};
use gomarket_db::KeyValueStore;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::persistence::{decode, Persister};
use crate::config::CartConfig;
use crate::error::{CartError, CartResult};

// =============================================================================
// Snapshot
// =============================================================================

/// An immutable view of the cart at one revision.
///
/// Cloning is cheap: the product list is shared until the next change, so
/// two snapshots with the same revision point at the same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    /// Bumped once per effective mutation or hydration.
    pub revision: u64,

    /// Line items in display order.
    pub products: Arc<[LineItem]>,
}

impl CartSnapshot {
    fn empty() -> Self {
        CartSnapshot {
            revision: 0,
            products: Arc::from(Vec::new()),
        }
    }

    /// Line items in display order.
    pub fn products(&self) -> &[LineItem] {
        &self.products
    }

    /// Looks up an item by product id.
    pub fn find(&self, id: &str) -> Option<&LineItem> {
        self.products.iter().find(|i| i.id == id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True when the cart holds no line items.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.products
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// True if both snapshots share the same product allocation.
    pub fn same_products(&self, other: &CartSnapshot) -> bool {
        Arc::ptr_eq(&self.products, &other.products)
    }
}

impl Serialize for CartSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CartSnapshot", 2)?;
        state.serialize_field("revision", &self.revision)?;
        state.serialize_field("products", &*self.products)?;
        state.end()
    }
}

/// Result of [`CartState::hydrate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Nothing stored under the key; the cart was left as it was.
    Empty,

    /// The stored snapshot replaced the cart.
    Restored { count: usize },

    /// The cart changed while the read was in flight; the stored snapshot
    /// was dropped.
    Superseded,
}

// =============================================================================
// Cart State
// =============================================================================

/// Cart container for one session.
pub struct CartState {
    cart: Mutex<Cart>,
    snapshot_tx: watch::Sender<CartSnapshot>,
    persister: Persister,
    load_timeout: Option<Duration>,
    validate_items: bool,
}

impl std::fmt::Debug for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartState")
            .field("key", &self.persister.key())
            .field("revision", &self.snapshot_tx.borrow().revision)
            .field("load_timeout", &self.load_timeout)
            .field("validate_items", &self.validate_items)
            .finish()
    }
}

impl CartState {
    /// Creates an empty container. Nothing is read from `store` until
    /// [`hydrate`](Self::hydrate) runs.
    pub fn new<S>(store: S, config: &CartConfig) -> CartResult<Self>
    where
        S: KeyValueStore + 'static,
    {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Like [`new`](Self::new) for a store that is already shared.
    pub fn with_shared_store(store: Arc<dyn KeyValueStore>, config: &CartConfig) -> CartResult<Self> {
        validate_storage_key(config.storage_key())
            .map_err(|e| CartError::InvalidConfig(e.to_string()))?;

        let (snapshot_tx, _) = watch::channel(CartSnapshot::empty());

        Ok(CartState {
            cart: Mutex::new(Cart::new()),
            snapshot_tx,
            persister: Persister::new(store, config.storage_key(), config.persistence.clone()),
            load_timeout: config.load_timeout(),
            validate_items: config.items.validate,
        })
    }

    /// Creates a container and restores the stored snapshot before returning.
    ///
    /// A failed restore is logged and leaves the container empty at revision
    /// 0; the next mutation overwrites whatever is stored. Only an invalid
    /// `config` is an error. Call [`hydrate`](Self::hydrate) directly to get
    /// the failure itself.
    pub async fn mount<S>(store: S, config: &CartConfig) -> CartResult<Self>
    where
        S: KeyValueStore + 'static,
    {
        let state = Self::new(store, config)?;
        match state.hydrate().await {
            Ok(outcome) => info!(key = %state.storage_key(), ?outcome, "Cart mounted"),
            Err(e) => warn!(
                key = %state.storage_key(),
                error = %e,
                "Cart mounted empty, stored snapshot not restored"
            ),
        }
        Ok(state)
    }

    /// Replaces the cart with the stored snapshot, if there is one.
    ///
    /// A missing key and an empty stored string both count as nothing stored.
    ///
    /// ## Errors
    /// - [`CartError::Storage`] when the read fails
    /// - [`CartError::LoadTimedOut`] when a configured timeout expires
    /// - [`CartError::CorruptSnapshot`] when the stored value is not a valid
    ///   list of line items
    ///
    /// The cart is unchanged on every error path.
    pub async fn hydrate(&self) -> CartResult<HydrateOutcome> {
        let started_at = self.snapshot_tx.borrow().revision;

        let raw = match self.load_timeout {
            Some(limit) => tokio::time::timeout(limit, self.persister.load())
                .await
                .map_err(|_| {
                    warn!(key = %self.persister.key(), ?limit, "Timed out loading stored cart");
                    CartError::LoadTimedOut(limit)
                })??,
            None => self.persister.load().await?,
        };

        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            debug!(key = %self.persister.key(), "No stored cart");
            return Ok(HydrateOutcome::Empty);
        };

        let restored = decode(&raw).map_err(|e| {
            warn!(key = %self.persister.key(), error = %e, "Ignoring unreadable stored cart");
            e
        })?;

        let mut cart = self.cart.lock().await;
        if self.snapshot_tx.borrow().revision != started_at {
            warn!(
                key = %self.persister.key(),
                "Cart changed while loading, keeping the in-memory cart"
            );
            return Ok(HydrateOutcome::Superseded);
        }

        let count = restored.item_count();
        *cart = restored;
        self.publish(&cart);

        info!(key = %self.persister.key(), count, "Cart restored from storage");
        Ok(HydrateOutcome::Restored { count })
    }

    /// Runs [`hydrate`](Self::hydrate) on a background task. The cart is
    /// usable, and empty, until it finishes.
    pub fn spawn_hydrate(self: &Arc<Self>) -> JoinHandle<CartResult<HydrateOutcome>> {
        let state = Arc::clone(self);
        tokio::spawn(async move { state.hydrate().await })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product, or adds one more unit of it.
    ///
    /// ## Behavior
    /// - Product already in cart: its fields are replaced by `item`'s and the
    ///   quantity goes up by one; it keeps its position
    /// - Otherwise: appended with quantity 1
    ///
    /// Fields are taken as given unless `[items] validate` is set.
    ///
    /// The new snapshot is published before it is written. If the write
    /// fails the change stays visible and [`CartError::Storage`] is returned.
    pub async fn add_to_cart(&self, item: NewLineItem) -> CartResult<CartSnapshot> {
        if self.validate_items {
            validate_new_line_item(&item)?;
        }

        let mut cart = self.cart.lock().await;
        let product_id = item.id.clone();
        let change = cart.add_item(item);
        debug!(product_id = %product_id, ?change, "Added to cart");

        let snapshot = self.publish(&cart);
        self.persister.write(&snapshot.products).await?;
        Ok(snapshot)
    }

    /// Adds one unit to the product with `id`. Unknown ids change nothing.
    pub async fn increment(&self, id: &str) -> CartResult<CartSnapshot> {
        self.adjust(id, Cart::increment, "increment").await
    }

    /// Removes one unit from the product with `id`. Unknown ids change
    /// nothing. The quantity is not floored: it can reach zero or go below.
    pub async fn decrement(&self, id: &str) -> CartResult<CartSnapshot> {
        self.adjust(id, Cart::decrement, "decrement").await
    }

    async fn adjust(
        &self,
        id: &str,
        op: fn(&mut Cart, &str) -> Option<i64>,
        action: &'static str,
    ) -> CartResult<CartSnapshot> {
        let mut cart = self.cart.lock().await;

        let Some(quantity) = op(&mut *cart, id) else {
            debug!(product_id = %id, action, "Product not in cart, nothing to do");
            return Ok(self.snapshot());
        };
        debug!(product_id = %id, action, quantity, "Quantity changed");

        let snapshot = self.publish(&cart);
        self.persister.write(&snapshot.products).await?;
        Ok(snapshot)
    }

    /// Writes the current snapshot again. Use after a mutation returned
    /// [`CartError::Storage`].
    pub async fn persist(&self) -> CartResult<()> {
        let _cart = self.cart.lock().await;
        let snapshot = self.snapshot();
        self.persister.write(&snapshot.products).await
    }

    fn publish(&self, cart: &Cart) -> CartSnapshot {
        let revision = self.snapshot_tx.borrow().revision + 1;
        let snapshot = CartSnapshot {
            revision,
            products: Arc::from(cart.items()),
        };
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current line items.
    pub fn products(&self) -> Arc<[LineItem]> {
        Arc::clone(&self.snapshot_tx.borrow().products)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver that is notified once per effective change.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Key the snapshot is read from and written to.
    pub fn storage_key(&self) -> &str {
        self.persister.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomarket_db::MemoryKeyValueStore;

    fn product(id: &str) -> NewLineItem {
        NewLineItem::new(id, format!("Product {}", id), format!("https://cdn/{}.png", id), 9.9)
    }

    fn state(store: &MemoryKeyValueStore) -> CartState {
        CartState::new(store.clone(), &CartConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_new_state_is_empty() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.revision, 0);
        assert!(snapshot.is_empty());
        assert_eq!(cart.storage_key(), "@GoMarket:products");
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_publishes_and_persists_new_snapshot() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);

        let snapshot = cart.add_to_cart(product("a")).await.unwrap();

        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.products()[0].quantity, 1);
        assert!(snapshot.same_products(&cart.snapshot()));

        let stored = store.peek("@GoMarket:products").await.unwrap();
        assert_eq!(stored, serde_json::to_string(snapshot.products()).unwrap());
    }

    #[tokio::test]
    async fn test_catalog_fields_are_stored_as_given() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);

        cart.add_to_cart(NewLineItem::new("a", "", "u", 10.0)).await.unwrap();
        let snapshot = cart
            .add_to_cart(NewLineItem::new("b", "x".repeat(500), "", -5.0))
            .await
            .unwrap();

        assert_eq!(snapshot.products()[0].title, "");
        assert_eq!(snapshot.products()[1].price, -5.0);
        assert_eq!(snapshot.products()[1].title.len(), 500);
        assert_eq!(store.write_count().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_item_is_rejected_when_validation_enabled() {
        let store = MemoryKeyValueStore::new();
        let mut config = CartConfig::default();
        config.items.validate = true;
        let cart = CartState::new(store.clone(), &config).unwrap();

        let err = cart
            .add_to_cart(NewLineItem::new("", "T", "u", 1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, CartError::InvalidItem(_)));
        assert_eq!(cart.snapshot().revision, 0);
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_id_returns_same_snapshot() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);
        let before = cart.add_to_cart(product("a")).await.unwrap();

        let after_inc = cart.increment("x").await.unwrap();
        let after_dec = cart.decrement("x").await.unwrap();

        assert_eq!(after_inc.revision, before.revision);
        assert!(after_inc.same_products(&before));
        assert!(after_dec.same_products(&before));
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_decrement_to_zero_and_below() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);
        cart.add_to_cart(product("a")).await.unwrap();

        let zero = cart.decrement("a").await.unwrap();
        let negative = cart.decrement("a").await.unwrap();

        assert_eq!(zero.find("a").map(|i| i.quantity), Some(0));
        assert_eq!(negative.find("a").map(|i| i.quantity), Some(-1));
        assert_eq!(negative.len(), 1);
    }

    #[tokio::test]
    async fn test_persist_rewrites_current_snapshot() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);
        store.fail_next_writes(1).await;

        assert!(cart.add_to_cart(product("a")).await.is_err());
        assert_eq!(cart.products().len(), 1);
        assert_eq!(store.peek("@GoMarket:products").await, None);

        cart.persist().await.unwrap();
        assert!(store.peek("@GoMarket:products").await.is_some());
    }

    #[tokio::test]
    async fn test_snapshot_serializes_revision_and_products() {
        let store = MemoryKeyValueStore::new();
        let cart = state(&store);
        let snapshot = cart.add_to_cart(product("a")).await.unwrap();

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["revision"], 1);
        assert_eq!(json["products"][0]["id"], "a");
        assert_eq!(json["products"][0]["image_url"], "https://cdn/a.png");
    }

    #[tokio::test]
    async fn test_empty_stored_string_counts_as_nothing_stored() {
        let store = MemoryKeyValueStore::with_entries([("@GoMarket:products", "")]);
        let cart = state(&store);

        assert_eq!(cart.hydrate().await.unwrap(), HydrateOutcome::Empty);
        assert_eq!(cart.snapshot().revision, 0);
    }

    #[tokio::test]
    async fn test_hydrate_yields_to_mutation_during_read() {
        let store = MemoryKeyValueStore::with_entries([(
            "@GoMarket:products",
            r#"[{"id":"old","title":"T","image_url":"u","price":1,"quantity":3}]"#,
        )]);
        store.stall_reads(true).await;
        let cart = Arc::new(state(&store));

        let hydration = cart.spawn_hydrate();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let added = tokio::time::timeout(Duration::from_millis(200), cart.add_to_cart(product("a")))
            .await
            .expect("add_to_cart blocked behind hydration")
            .unwrap();
        assert_eq!(added.len(), 1);

        store.stall_reads(false).await;

        assert_eq!(hydration.await.unwrap().unwrap(), HydrateOutcome::Superseded);
        assert_eq!(cart.snapshot(), added);
        assert_eq!(cart.products()[0].id, "a");
    }

    #[test]
    fn test_empty_storage_key_is_rejected() {
        let mut config = CartConfig::default();
        config.storage.key = String::new();

        let result = CartState::new(MemoryKeyValueStore::new(), &config);
        assert!(matches!(result, Err(CartError::InvalidConfig(_))));
    }
}
