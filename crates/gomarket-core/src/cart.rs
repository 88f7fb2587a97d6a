//! # Cart
//!
//! The ordered, id-unique sequence of line items and the three mutations the
//! storefront performs on it.
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_item(new)                                                          │
//! │    ├── id already present ──► replace fields in place, quantity + 1     │
//! │    └── id not present ──────► append at the end, quantity = 1           │
//! │                                                                         │
//! │  increment(id) ─────────────► quantity + 1   (unknown id: no change)    │
//! │  decrement(id) ─────────────► quantity - 1   (unknown id: no change)    │
//! │                                             (no floor at 0)             │
//! │                                                                         │
//! │  Position of an existing item never changes.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::types::{LineItem, NewLineItem};

/// What [`Cart::add_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line item was appended at `position`.
    Inserted { position: usize },

    /// An existing line item at `position` was overwritten and now holds
    /// `quantity` units.
    Merged { position: usize, quantity: i64 },
}

/// The shopping cart contents.
///
/// ## Invariants
/// - At most one item per product id
/// - Items keep insertion order; updates never move an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from previously stored items, keeping their order and
    /// quantities exactly.
    ///
    /// ## Errors
    /// [`CoreError::DuplicateLineItem`] if two items share an id.
    pub fn from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CoreError::DuplicateLineItem(item.id.clone()));
            }
        }

        Ok(Cart { items })
    }

    /// Adds a product, or bumps its quantity when it is already in the cart.
    ///
    /// The incoming fields (title, price, image) overwrite the stored ones so
    /// the cart shows the latest catalog data.
    pub fn add_item(&mut self, item: NewLineItem) -> CartChange {
        if let Some(position) = self.position(&item.id) {
            let existing = &mut self.items[position];
            let quantity = existing.quantity.saturating_add(1);
            *existing = LineItem::from_new(item, quantity);
            return CartChange::Merged { position, quantity };
        }

        self.items.push(LineItem::from_new(item, 1));
        CartChange::Inserted {
            position: self.items.len() - 1,
        }
    }

    /// Adds one unit to the item with `id`.
    ///
    /// ## Returns
    /// The new quantity, or `None` if no item has that id.
    pub fn increment(&mut self, id: &str) -> Option<i64> {
        self.adjust(id, 1)
    }

    /// Removes one unit from the item with `id`.
    ///
    /// The quantity may reach zero or go negative; the item stays in the cart.
    ///
    /// ## Returns
    /// The new quantity, or `None` if no item has that id.
    pub fn decrement(&mut self, id: &str) -> Option<i64> {
        self.adjust(id, -1)
    }

    fn adjust(&mut self, id: &str, delta: i64) -> Option<i64> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.quantity = item.quantity.saturating_add(delta);
        Some(item.quantity)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Looks up an item by product id.
    pub fn find(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Returns the number of distinct products.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the sum of all quantities (the badge number).
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: f64) -> NewLineItem {
        NewLineItem::new(id, format!("Product {}", id), format!("https://cdn/{}.png", id), price)
    }

    fn assert_unique_ids(cart: &Cart) {
        let ids: HashSet<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), cart.item_count());
    }

    #[test]
    fn test_add_to_empty_cart() {
        let mut cart = Cart::new();

        let change = cart.add_item(product("a", 10.0));

        assert_eq!(change, CartChange::Inserted { position: 0 });
        assert_eq!(
            cart.items(),
            &[LineItem {
                id: "a".to_string(),
                title: "Product a".to_string(),
                image_url: "https://cdn/a.png".to_string(),
                price: 10.0,
                quantity: 1,
            }]
        );
    }

    #[test]
    fn test_add_same_product_merges_and_overwrites_fields() {
        let mut cart = Cart::new();
        cart.add_item(product("a", 10.0));
        cart.add_item(product("b", 5.0));

        let change = cart.add_item(NewLineItem::new("a", "Renamed", "https://cdn/new.png", 12.5));

        assert_eq!(change, CartChange::Merged { position: 0, quantity: 2 });
        assert_eq!(cart.item_count(), 2);

        let a = &cart.items()[0];
        assert_eq!(a.id, "a");
        assert_eq!(a.title, "Renamed");
        assert_eq!(a.image_url, "https://cdn/new.png");
        assert_eq!(a.price, 12.5);
        assert_eq!(a.quantity, 2);
        assert_eq!(cart.items()[1].id, "b");
    }

    #[test]
    fn test_increment_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(product("a", 10.0));
        let before = cart.clone();

        assert_eq!(cart.increment("x"), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_has_no_floor() {
        let mut cart = Cart::new();
        cart.add_item(product("a", 10.0));

        assert_eq!(cart.decrement("a"), Some(0));
        assert_eq!(cart.decrement("a"), Some(-1));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_increment_and_decrement_preserve_order() {
        let mut cart = Cart::new();
        cart.add_item(product("a", 1.0));
        cart.add_item(product("b", 2.0));
        cart.add_item(product("c", 3.0));

        cart.increment("b");
        cart.decrement("a");
        cart.add_item(product("b", 2.0));

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(cart.find("b").map(|i| i.quantity), Some(3));
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_mixed_operations_keep_ids_unique() {
        let mut cart = Cart::new();
        let ids = ["a", "b", "a", "c", "b", "a"];

        for (step, id) in ids.iter().enumerate() {
            match step % 3 {
                0 => {
                    cart.add_item(product(id, 1.0));
                }
                1 => {
                    cart.add_item(product(id, 1.0));
                    cart.increment(id);
                }
                _ => {
                    cart.decrement(id);
                    cart.add_item(product(id, 1.0));
                }
            }
            assert_unique_ids(&cart);
        }

        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_quantity_saturates() {
        let mut cart = Cart::from_items(vec![LineItem {
            id: "a".to_string(),
            title: "T".to_string(),
            image_url: String::new(),
            price: 1.0,
            quantity: i64::MAX,
        }])
        .unwrap();

        assert_eq!(cart.increment("a"), Some(i64::MAX));
        assert_eq!(cart.total_quantity(), i64::MAX);
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let item = LineItem::from_new(product("a", 1.0), 1);
        let err = Cart::from_items(vec![item.clone(), item]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateLineItem(id) if id == "a"));
    }

    #[test]
    fn test_from_items_keeps_order_and_quantities() {
        let items = vec![
            LineItem::from_new(product("b", 1.0), 0),
            LineItem::from_new(product("a", 2.0), 7),
        ];

        let cart = Cart::from_items(items.clone()).unwrap();
        assert_eq!(cart.into_items(), items);
    }
}
