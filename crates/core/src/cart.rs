//! Session cart: a mapping from item slug to quantity.
//!
//! The cart never checks slugs against the menu. Entries that no longer
//! resolve are skipped when totals are computed (see [`crate::nutrition`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Quantity, Slug};

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Adding would exceed the largest representable quantity.
    #[error("quantity for {0} would overflow")]
    QuantityOverflow(Slug),
}

/// Quantities keyed by slug.
///
/// Stored quantities are always at least 1. The map is ordered so that
/// iteration, serialization, and anything computed from them are
/// deterministic for a given cart.
///
/// Serializes as a plain JSON object, e.g. `{"big-mac":2,"fries":1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: BTreeMap<Slug, Quantity>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase the quantity of `slug` by `qty`, inserting it if absent.
    ///
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if the sum does not fit in a
    /// `u32`. The cart is left unchanged in that case.
    pub fn add(&mut self, slug: Slug, qty: Quantity) -> Result<Quantity, CartError> {
        let updated = match self.entries.get(&slug) {
            Some(current) => current
                .checked_add(qty)
                .ok_or_else(|| CartError::QuantityOverflow(slug.clone()))?,
            None => qty,
        };
        self.entries.insert(slug, updated);
        Ok(updated)
    }

    /// Take one unit of `slug` out of the cart.
    ///
    /// An entry holding a single unit is deleted. Returns the remaining
    /// quantity (0 once deleted), or `None` if the slug was not in the cart.
    pub fn remove(&mut self, slug: &str) -> Option<u32> {
        let current = self.entries.get_mut(slug)?;
        // Stored quantities are >= 1, so this only yields `None` at exactly 1.
        if let Some(remaining) = Quantity::new(current.get() - 1) {
            *current = remaining;
            Some(remaining.get())
        } else {
            self.entries.remove(slug);
            Some(0)
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Quantity stored for `slug`, or 0 when absent.
    #[must_use]
    pub fn quantity(&self, slug: &str) -> u32 {
        self.entries.get(slug).map_or(0, |q| q.get())
    }

    /// Returns `true` if the cart has an entry for `slug`.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    /// Number of distinct slugs in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in slug order.
    pub fn iter(&self) -> impl Iterator<Item = (&Slug, Quantity)> {
        self.entries.iter().map(|(slug, qty)| (slug, *qty))
    }

    /// Iterate slugs in order.
    pub fn slugs(&self) -> impl Iterator<Item = &Slug> {
        self.entries.keys()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn slug(s: &str) -> Slug {
        Slug::parse(s).unwrap()
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_add_inserts_then_increments() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(slug("big-mac"), Quantity::ONE).unwrap().get(), 1);
        assert_eq!(cart.add(slug("big-mac"), qty(3)).unwrap().get(), 4);
        assert_eq!(cart.quantity("big-mac"), 4);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(slug("fries"), qty(u32::MAX)).unwrap();
        let before = cart.clone();

        let err = cart.add(slug("fries"), Quantity::ONE).unwrap_err();
        assert_eq!(err, CartError::QuantityOverflow(slug("fries")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_quantity_defaults_to_zero() {
        let cart = Cart::new();
        assert_eq!(cart.quantity("anything"), 0);
        assert!(!cart.contains("anything"));
    }

    #[test]
    fn test_remove_decrements() {
        let mut cart = Cart::new();
        cart.add(slug("mcflurry"), qty(3)).unwrap();
        assert_eq!(cart.remove("mcflurry"), Some(2));
        assert_eq!(cart.quantity("mcflurry"), 2);
    }

    #[test]
    fn test_remove_single_unit_deletes_entry_then_noop() {
        let mut cart = Cart::new();
        cart.add(slug("cola"), Quantity::ONE).unwrap();

        assert_eq!(cart.remove("cola"), Some(0));
        assert!(!cart.contains("cola"));
        assert!(cart.is_empty());

        assert_eq!(cart.remove("cola"), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_slug_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(slug("fries"), qty(2)).unwrap();
        let before = cart.clone();

        assert_eq!(cart.remove("nuggets"), None);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        for start in 0..5 {
            let mut cart = Cart::new();
            cart.add(slug("other"), qty(7)).unwrap();
            if let Some(q) = Quantity::new(start) {
                cart.add(slug("wrap"), q).unwrap();
            }
            let before = cart.clone();

            cart.add(slug("wrap"), Quantity::ONE).unwrap();
            cart.remove("wrap");

            assert_eq!(cart, before, "starting quantity {start}");
        }
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(slug("a"), qty(2)).unwrap();
        cart.add(slug("b"), qty(1)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
    }

    #[test]
    fn test_serde_shape() {
        let mut cart = Cart::new();
        cart.add(slug("fries"), qty(1)).unwrap();
        cart.add(slug("big-mac"), qty(2)).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(json, r#"{"big-mac":2,"fries":1}"#);

        let parsed: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cart);
    }

    #[test]
    fn test_deserialize_rejects_zero_quantity() {
        assert!(serde_json::from_str::<Cart>(r#"{"fries":0}"#).is_err());
        assert!(serde_json::from_str::<Cart>(r#"{"":1}"#).is_err());
    }
}
