//! Menu query service.

use sqlx::SqliteConnection;

use mcd_calories_core::{Cart, ItemFilter, MenuItem};

use crate::db::{ItemRepository, RepositoryError};

/// Everything the menu page lists.
#[derive(Debug, Clone)]
pub struct MenuPage {
    /// All categories, so the filter bar stays complete while filtering.
    pub categories: Vec<String>,
    /// Items matching the filter, sorted by name.
    pub items: Vec<MenuItem>,
    /// The visitor's cart, for per-item quantity badges.
    pub cart: Cart,
}

/// Load categories and filtered items.
///
/// # Errors
///
/// Returns `RepositoryError` if either query fails.
pub async fn load_menu(
    conn: &mut SqliteConnection,
    filter: &ItemFilter,
    cart: Cart,
) -> Result<MenuPage, RepositoryError> {
    let mut repo = ItemRepository::new(conn);
    let categories = repo.list_categories().await?;
    let items = repo.list_items(filter).await?;

    tracing::debug!(
        categories = categories.len(),
        items = items.len(),
        ?filter,
        "Loaded menu"
    );

    Ok(MenuPage {
        categories,
        items,
        cart,
    })
}
