//! # gomarket-core: Pure Cart Logic for the GoMarket Storefront
//!
//! This crate holds the cart's data model and mutation rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile UI (screens)                          │   │
//! │  │    Dashboard ──► Cart screen ──► Floating cart badge            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ use_cart()                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gomarket-cart (CartState)                       │   │
//! │  │    add_to_cart, increment, decrement, hydrate                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   cart    │  │ validation│                  │   │
//! │  │   │ LineItem  │  │   Cart    │  │   rules   │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gomarket-db (Key-Value Store)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types shared with the frontend
//! - [`cart`] - The ordered, id-unique line item sequence and its mutations
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for items entering the cart
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{Cart, NewLineItem};
//!
//! let mut cart = Cart::new();
//! let item = NewLineItem::new("a", "Tenis", "https://cdn/tenis.png", 179.9);
//!
//! cart.add_item(item.clone());
//! cart.add_item(item);
//!
//! assert_eq!(cart.item_count(), 1);
//! assert_eq!(cart.items()[0].quantity, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{LineItem, NewLineItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart snapshot lives under.
///
/// Namespaced with the app name so other features sharing the device store
/// don't collide with it.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarket:products";

/// Maximum length of a product id.
pub const MAX_PRODUCT_ID_LEN: usize = 100;

/// Maximum length of a product title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of a product image URL.
pub const MAX_IMAGE_URL_LEN: usize = 2048;
