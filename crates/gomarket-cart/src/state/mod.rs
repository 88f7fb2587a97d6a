//! # State Module
//!
//! The cart container and its persistence.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartState                                                              │
//! │  ├── Mutex<Cart>               exclusive owner of the line items        │
//! │  ├── watch::Sender<Snapshot>   latest published view for readers        │
//! │  └── Persister                 store + key + retry policy               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
mod persistence;

pub use cart::{CartSnapshot, CartState, HydrateOutcome};
