//! # Domain Types
//!
//! Line item types shared between the cart container, the persisted
//! snapshot and the mobile frontend.
//!
//! ## Type Relationship
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐   add_to_cart   ┌─────────────────┐               │
//! │  │   NewLineItem   │ ──────────────► │    LineItem     │               │
//! │  │  ─────────────  │                 │  ─────────────  │               │
//! │  │  id             │                 │  id             │               │
//! │  │  title          │                 │  title          │               │
//! │  │  image_url      │                 │  image_url      │               │
//! │  │  price          │                 │  price          │               │
//! │  └─────────────────┘                 │  quantity       │               │
//! │                                      └─────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are serialized as-is (`image_url` stays snake_case). Stored
//! snapshots use exactly these keys.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Line Item
// =============================================================================

/// A product in the cart together with how many units the shopper wants.
///
/// `quantity` is signed: decrementing has no floor, so zero and negative
/// quantities are representable and round-trip through storage unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Unique product identifier.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Product image shown in the cart list.
    pub image_url: String,

    /// Unit price as delivered by the catalog. Stored, never computed on.
    pub price: f64,

    /// Units in the cart.
    #[ts(type = "number")]
    pub quantity: i64,
}

impl LineItem {
    /// Builds a line item from an incoming product and a quantity.
    pub fn from_new(item: NewLineItem, quantity: i64) -> Self {
        LineItem {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity,
        }
    }
}

// =============================================================================
// New Line Item
// =============================================================================

/// A product about to be added to the cart (a [`LineItem`] without quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewLineItem {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        NewLineItem {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

impl From<LineItem> for NewLineItem {
    fn from(item: LineItem) -> Self {
        NewLineItem {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
