//! Menu items and listing filters.

use serde::{Deserialize, Serialize};

use crate::types::Slug;

/// One row of the menu.
///
/// Nutritional values are per serving as described by `serving_label`.
/// Gram fields are never negative in well-formed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique, stable identifier used as the cart key.
    pub slug: Slug,
    /// Display name.
    pub name: String,
    /// Category key (e.g. `classic`, `fries`).
    pub category: String,
    /// Energy in kilocalories.
    pub energy_kcal: i64,
    pub fat_g: f64,
    pub sat_fat_g: f64,
    pub carbs_g: f64,
    pub sugars_g: f64,
    pub fiber_g: f64,
    pub protein_g: f64,
    pub salt_g: f64,
    /// Human-readable serving size, e.g. `1 szt. (118 g)`.
    pub serving_label: String,
}

/// Optional category and name filters for a menu listing.
///
/// Both filters are optional and combine with AND. Construct through
/// [`ItemFilter::new`] so blank request parameters mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    category: Option<String>,
    query: Option<String>,
}

impl ItemFilter {
    /// A filter that matches every item.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from raw request parameters.
    ///
    /// An empty category is ignored. The name query is trimmed and ignored
    /// when nothing is left.
    #[must_use]
    pub fn new(category: Option<&str>, query: Option<&str>) -> Self {
        let category = category.filter(|c| !c.is_empty()).map(str::to_owned);
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_owned);
        Self { category, query }
    }

    /// Exact category to match, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Name substring to match, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns `true` when no filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.query.is_none()
    }

    /// Returns `true` if the item's name contains the query, ignoring case.
    ///
    /// Always `true` when no query is set.
    #[must_use]
    pub fn matches_name(&self, item: &MenuItem) -> bool {
        self.query.as_deref().is_none_or(|q| {
            item.name.to_lowercase().contains(&q.to_lowercase())
        })
    }

    /// Returns `true` if the item satisfies both filters.
    #[must_use]
    pub fn matches(&self, item: &MenuItem) -> bool {
        self.category.as_deref().is_none_or(|c| item.category == c) && self.matches_name(item)
    }
}
