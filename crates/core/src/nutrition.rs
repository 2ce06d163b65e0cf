//! Nutritional aggregation over a cart.
//!
//! Totals are derived on every read from the menu rows passed in, so they
//! always reflect current data rather than what the item looked like when
//! it was added. Cart entries with no matching row are left out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cart::Cart;
use crate::menu::MenuItem;
use crate::types::Quantity;

/// Quantity-weighted sums of the tracked nutrients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub energy_kcal: i64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
    pub salt_g: f64,
}

impl NutritionTotals {
    /// Add `qty` servings of `item`.
    fn add_weighted(&mut self, item: &MenuItem, qty: Quantity) {
        let n = qty.get();
        let factor = f64::from(n);
        self.energy_kcal = self
            .energy_kcal
            .saturating_add(item.energy_kcal.saturating_mul(i64::from(n)));
        self.protein_g += item.protein_g * factor;
        self.fat_g += item.fat_g * factor;
        self.carbs_g += item.carbs_g * factor;
        self.salt_g += item.salt_g * factor;
    }
}

/// A resolved cart entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutLine {
    pub item: MenuItem,
    pub quantity: Quantity,
}

impl CheckoutLine {
    /// Energy for this line (item energy times quantity).
    #[must_use]
    pub fn energy_kcal(&self) -> i64 {
        self.item
            .energy_kcal
            .saturating_mul(i64::from(self.quantity.get()))
    }
}

/// Resolved cart contents with totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Checkout {
    /// Lines ordered by item name, then slug.
    pub lines: Vec<CheckoutLine>,
    pub total: NutritionTotals,
}

impl Checkout {
    /// An empty checkout with zero totals.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Join `cart` against `items`.
    ///
    /// `items` may contain rows that are not in the cart; they are ignored.
    /// If a slug appears more than once in `items`, the first row wins.
    #[must_use]
    pub fn compute(items: impl IntoIterator<Item = MenuItem>, cart: &Cart) -> Self {
        if cart.is_empty() {
            return Self::empty();
        }

        let mut resolved: BTreeMap<String, MenuItem> = BTreeMap::new();
        for item in items {
            if cart.contains(item.slug.as_str()) && !resolved.contains_key(item.slug.as_str()) {
                resolved.insert(item.slug.as_str().to_owned(), item);
            }
        }

        let mut lines: Vec<CheckoutLine> = cart
            .iter()
            .filter_map(|(slug, quantity)| {
                resolved
                    .remove(slug.as_str())
                    .map(|item| CheckoutLine { item, quantity })
            })
            .collect();
        lines.sort_by(|a, b| {
            a.item
                .name
                .cmp(&b.item.name)
                .then_with(|| a.item.slug.cmp(&b.item.slug))
        });

        let mut total = NutritionTotals::default();
        for line in &lines {
            total.add_weighted(&line.item, line.quantity);
        }

        Self { lines, total }
    }

    /// Returns `true` if nothing in the cart resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Compact cart figures shown on every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CartSummary {
    /// Units across resolved entries.
    pub count: u64,
    pub kcal: i64,
    pub protein: f64,
}

impl CartSummary {
    /// Summarize `cart` against `items`, skipping unresolved slugs.
    #[must_use]
    pub fn compute(items: impl IntoIterator<Item = MenuItem>, cart: &Cart) -> Self {
        Self::from(&Checkout::compute(items, cart))
    }
}

impl From<&Checkout> for CartSummary {
    fn from(checkout: &Checkout) -> Self {
        Self {
            count: checkout
                .lines
                .iter()
                .map(|line| u64::from(line.quantity.get()))
                .sum(),
            kcal: checkout.total.energy_kcal,
            protein: checkout.total.protein_g,
        }
    }
}
