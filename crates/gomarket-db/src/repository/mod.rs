//! # Repository Module
//!
//! SQLite-backed repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartState                                                              │
//! │       │                                                                 │
//! │       │  store.set_item("@GoMarket:products", "[...]")                  │
//! │       ▼                                                                 │
//! │  KeyValueRepository                                                     │
//! │  ├── get_item(&self, key)                                               │
//! │  ├── set_item(&self, key, value)   (INSERT ... ON CONFLICT DO UPDATE)   │
//! │  ├── remove_item(&self, key)                                            │
//! │  ├── keys(&self)                                                        │
//! │  └── count(&self)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  key_value_store table                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`key_value::KeyValueRepository`] - Durable [`crate::KeyValueStore`]

pub mod key_value;
