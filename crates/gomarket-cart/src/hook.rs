//! # Cart Provider and Access Hook
//!
//! UI code does not receive the cart as an argument at every level. A
//! [`CartProvider`] makes one container current for everything that runs
//! inside its scope, and [`use_cart`] fetches it back.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  provider.scope(async {                                                 │
//! │      let cart = use_cart()?;          ◄── nearest enclosing provider    │
//! │      cart.add_to_cart(item).await?;                                     │
//! │                                                                         │
//! │      other.scope(async {                                                │
//! │          use_cart()?                  ◄── `other` wins in here          │
//! │      }).await;                                                          │
//! │  }).await;                                                              │
//! │                                                                         │
//! │  use_cart()                           ◄── MissingProviderError          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scope is task-local. A task spawned inside a scope does not see it;
//! pass it a [`CartHandle`] or wrap its future in `provider.scope(..)`.

use std::future::Future;
use std::sync::Arc;

use gomarket_db::KeyValueStore;

use crate::config::CartConfig;
use crate::error::{CartResult, MissingProviderError};
use crate::state::CartState;

/// Shared handle to a cart container.
pub type CartHandle = Arc<CartState>;

tokio::task_local! {
    static CURRENT_CART: CartHandle;
}

/// Makes a cart container available to [`use_cart`].
#[derive(Debug, Clone)]
pub struct CartProvider {
    cart: CartHandle,
}

impl CartProvider {
    /// Wraps an existing container.
    pub fn new(cart: CartHandle) -> Self {
        CartProvider { cart }
    }

    /// Builds a container, restores the stored cart and wraps it. The
    /// provider exists even when the restore fails; see [`CartState::mount`].
    pub async fn mount<S>(store: S, config: &CartConfig) -> CartResult<Self>
    where
        S: KeyValueStore + 'static,
    {
        let state = CartState::mount(store, config).await?;
        Ok(CartProvider::new(Arc::new(state)))
    }

    /// The container this provider exposes.
    pub fn handle(&self) -> CartHandle {
        Arc::clone(&self.cart)
    }

    /// Runs `future` with this provider's cart as the current one.
    pub async fn scope<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_CART.scope(self.handle(), future).await
    }

    /// Runs `f` with this provider's cart as the current one.
    pub fn sync_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_CART.sync_scope(self.handle(), f)
    }
}

impl From<CartHandle> for CartProvider {
    fn from(cart: CartHandle) -> Self {
        CartProvider::new(cart)
    }
}

/// Returns the cart of the nearest enclosing [`CartProvider`] scope.
///
/// ## Errors
/// [`MissingProviderError`] when called outside every provider scope.
pub fn use_cart() -> Result<CartHandle, MissingProviderError> {
    CURRENT_CART
        .try_with(Arc::clone)
        .map_err(|_| MissingProviderError)
}
