//! # gomarket-db: Persistent Key-Value Store
//!
//! This crate provides the device-local storage the cart snapshot is written
//! to. Callers program against the [`KeyValueStore`] trait; two
//! implementations ship with it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Storage Flow                            │
//! │                                                                         │
//! │  CartState (add_to_cart / increment / decrement / hydrate)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   gomarket-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │ KeyValueStore  │◄──│ KeyValueRepository │  │ Migrations │  │   │
//! │  │   │    (trait)     │   │  (SQLite, pool.rs) │  │ (embedded) │  │   │
//! │  │   │                │◄──│ MemoryKeyValueStore│  │            │  │   │
//! │  │   └────────────────┘   └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/gomarket/cart.db                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `KeyValueStore` trait and the in-memory implementation
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQLite-backed repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_db::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("path/to/cart.db")).await?;
//! let store = db.key_values();
//!
//! store.set_item("@GoMarket:products", "[]").await?;
//! let raw = store.get_item("@GoMarket:products").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::key_value::KeyValueRepository;
pub use store::memory::MemoryKeyValueStore;
pub use store::KeyValueStore;
