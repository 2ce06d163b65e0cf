//! Session cart persistence and cart aggregation.
//!
//! The cart lives in the visitor's session under
//! [`session_keys::CART`](crate::models::session_keys::CART). Totals are
//! computed against the current `items` rows on every call.

use sqlx::SqliteConnection;
use tower_sessions::Session;
use tower_sessions::session::Error as SessionError;

use mcd_calories_core::{Cart, CartSummary, Checkout};

use crate::db::{ItemRepository, RepositoryError};
use crate::models::session_keys;

/// Load the cart from the session, or an empty cart if there is none.
///
/// A stored cart that no longer deserializes is discarded with a warning
/// rather than failing every page for that visitor.
///
/// # Errors
///
/// Returns the session store error if the session cannot be loaded.
pub async fn load_cart(session: &Session) -> Result<Cart, SessionError> {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(SessionError::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable cart in session");
            Ok(Cart::default())
        }
        Err(e) => Err(e),
    }
}

/// Store the cart in the session.
///
/// An empty cart removes the key instead of storing `{}`.
///
/// # Errors
///
/// Returns the session error if the cart cannot be serialized or stored.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), SessionError> {
    if cart.is_empty() {
        return clear_cart(session).await;
    }
    session.insert(session_keys::CART, cart).await
}

/// Remove the cart from the session entirely.
///
/// # Errors
///
/// Returns the session store error if the session cannot be loaded.
pub async fn clear_cart(session: &Session) -> Result<(), SessionError> {
    session.remove_value(session_keys::CART).await?;
    Ok(())
}

/// Resolve the cart against the store and total it.
///
/// Slugs with no matching row are left out. An empty cart does not touch
/// the database.
///
/// # Errors
///
/// Returns `RepositoryError` if the lookup fails.
pub async fn checkout(
    conn: &mut SqliteConnection,
    cart: &Cart,
) -> Result<Checkout, RepositoryError> {
    if cart.is_empty() {
        return Ok(Checkout::empty());
    }

    let items = ItemRepository::new(conn)
        .find_by_slugs(cart.slugs())
        .await?;
    let checkout = Checkout::compute(items, cart);

    let unresolved = cart.len() - checkout.lines.len();
    if unresolved > 0 {
        tracing::debug!(unresolved, "Skipped cart entries with no menu item");
    }

    Ok(checkout)
}

/// Count, energy, and protein for the layout badge.
///
/// # Errors
///
/// Returns `RepositoryError` if the lookup fails.
pub async fn summary(
    conn: &mut SqliteConnection,
    cart: &Cart,
) -> Result<CartSummary, RepositoryError> {
    Ok(CartSummary::from(&checkout(conn, cart).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::db::acquire;
    use crate::db::items::tests::seeded_pool;
    use mcd_calories_core::{Quantity, Slug};

    fn cart(entries: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (slug, n) in entries {
            cart.add(Slug::parse(slug).unwrap(), Quantity::new(*n).unwrap())
                .unwrap();
        }
        cart
    }

    #[tokio::test]
    async fn test_checkout_resolves_against_store() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let checkout = checkout(&mut conn, &cart(&[("cheeseburger", 2), ("cola", 1)]))
            .await
            .unwrap();

        let slugs: Vec<_> = checkout
            .lines
            .iter()
            .map(|l| l.item.slug.as_str())
            .collect();
        assert_eq!(slugs, ["cheeseburger", "cola"]);
        assert_eq!(checkout.total.energy_kcal, 2 * 300 + 170);
        assert_eq!(checkout.total.protein_g, 3.0 * 12.5);
    }

    #[tokio::test]
    async fn test_checkout_skips_unknown_slug() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let checkout = checkout(&mut conn, &cart(&[("unknown-slug", 1)]))
            .await
            .unwrap();

        assert!(checkout.is_empty());
        assert_eq!(checkout.total.energy_kcal, 0);
    }

    #[tokio::test]
    async fn test_summary_of_empty_cart() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let summary = summary(&mut conn, &Cart::new()).await.unwrap();

        assert_eq!(summary, CartSummary::default());
        assert_eq!(summary.protein, 0.0);
    }

    #[tokio::test]
    async fn test_summary_counts_resolved_units_only() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let summary = summary(&mut conn, &cart(&[("big-mac", 3), ("ghost", 9)]))
            .await
            .unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.kcal, 3 * 503);
        assert_eq!(summary.protein, 37.5);
    }
}
