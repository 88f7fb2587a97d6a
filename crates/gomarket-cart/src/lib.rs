//! # gomarket-cart: Cart State and Access Hook
//!
//! The cart as the storefront screens see it: one container per session,
//! restored from device storage on mount, written back after every change,
//! and reachable from any code running under a [`CartProvider`].
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. init_tracing()           RUST_LOG or "info,gomarket=debug,..."      │
//! │                                                                         │
//! │  2. CartConfig::load(None)   defaults < cart.toml < GOMARKET_* env      │
//! │                                                                         │
//! │  3. config.open_database()   SQLite file, WAL, migrations               │
//! │                                                                         │
//! │  4. CartProvider::mount(db.key_values(), &config)                       │
//! │        └── CartState::new + hydrate from "@GoMarket:products"           │
//! │                                                                         │
//! │  5. provider.scope(app).await                                           │
//! │        └── use_cart() anywhere inside                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let config = CartConfig::load(None)?;
//! let db = config.open_database().await?;
//! let provider = CartProvider::mount(db.key_values(), &config).await?;
//!
//! provider
//!     .scope(async {
//!         let cart = use_cart()?;
//!         cart.add_to_cart(NewLineItem::new("1", "Camiseta", "https://cdn/1.png", 59.9))
//!             .await?;
//!         Ok::<_, CartError>(())
//!     })
//!     .await?;
//! ```

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod hook;
pub mod state;

pub use config::{
    CartConfig, HydrationSettings, ItemSettings, PersistenceSettings, StorageSettings,
};
pub use error::{ApiError, CartError, CartResult, ErrorCode, MissingProviderError};
pub use hook::{use_cart, CartHandle, CartProvider};
pub use state::{CartSnapshot, CartState, HydrateOutcome};

pub use gomarket_core::{LineItem, NewLineItem, DEFAULT_STORAGE_KEY};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,gomarket=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=gomarket_cart=trace` - Trace the cart crate only
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
