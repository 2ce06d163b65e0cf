//! Item repository for the `items` table.
//!
//! Read queries serve the web flows. [`upsert_items`] and
//! [`ItemRepository::category_counts`] exist for the CLI seeding path.

use sqlx::{Connection, FromRow, QueryBuilder, Sqlite, SqliteConnection};

use mcd_calories_core::{ItemFilter, MenuItem, Slug};

use super::RepositoryError;

/// `SELECT` over every `MenuItem` column, followed by `$tail`.
macro_rules! select_items {
    ($tail:literal) => {
        concat!(
            "SELECT slug, name, category, energy_kcal, fat_g, sat_fat_g, carbs_g, ",
            "sugars_g, fiber_g, protein_g, salt_g, serving_label FROM items",
            $tail
        )
    };
}

/// Raw `items` row.
///
/// The slug is read as plain text because rows may come from outside the
/// seeding tool; see [`ItemRow::into_item`].
#[derive(Debug, FromRow)]
struct ItemRow {
    slug: Option<String>,
    name: String,
    category: String,
    energy_kcal: i64,
    fat_g: f64,
    sat_fat_g: f64,
    carbs_g: f64,
    sugars_g: f64,
    fiber_g: f64,
    protein_g: f64,
    salt_g: f64,
    serving_label: String,
}

impl ItemRow {
    /// Convert to a [`MenuItem`], or `None` when the slug is missing or
    /// invalid. Such a row cannot be put in a cart, so it is left out of
    /// listings rather than failing them.
    fn into_item(self) -> Option<MenuItem> {
        let slug = match self.slug.as_deref().map(Slug::parse) {
            Some(Ok(slug)) => slug,
            Some(Err(err)) => {
                tracing::warn!(name = %self.name, error = %err, "Skipping item with invalid slug");
                return None;
            }
            None => {
                tracing::warn!(name = %self.name, "Skipping item without slug");
                return None;
            }
        };

        Some(MenuItem {
            slug,
            name: self.name,
            category: self.category,
            energy_kcal: self.energy_kcal,
            fat_g: self.fat_g,
            sat_fat_g: self.sat_fat_g,
            carbs_g: self.carbs_g,
            sugars_g: self.sugars_g,
            fiber_g: self.fiber_g,
            protein_g: self.protein_g,
            salt_g: self.salt_g,
            serving_label: self.serving_label,
        })
    }
}

/// Repository over one borrowed connection.
pub struct ItemRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ItemRepository<'c> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Distinct category names in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&mut self) -> Result<Vec<String>, RepositoryError> {
        let categories =
            sqlx::query_scalar("SELECT DISTINCT category FROM items ORDER BY category ASC")
                .fetch_all(&mut *self.conn)
                .await?;
        Ok(categories)
    }

    /// Items matching `filter`, sorted by name (then slug).
    ///
    /// The category is matched exactly in SQL. The name query is applied
    /// afterwards with Unicode lowercasing, which `SQLite`'s `LIKE` and
    /// `LOWER` only do for ASCII.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_items(
        &mut self,
        filter: &ItemFilter,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = match filter.category() {
            Some(category) => {
                sqlx::query_as::<_, ItemRow>(select_items!(
                    " WHERE category = ?1 ORDER BY name ASC, slug ASC"
                ))
                .bind(category)
                .fetch_all(&mut *self.conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, ItemRow>(select_items!(" ORDER BY name ASC, slug ASC"))
                    .fetch_all(&mut *self.conn)
                    .await?
            }
        };

        Ok(rows
            .into_iter()
            .filter_map(ItemRow::into_item)
            .filter(|item| filter.matches_name(item))
            .collect())
    }

    /// Items whose slug is in `slugs`, sorted by name (then slug).
    ///
    /// Slugs without a row are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_slugs<'s>(
        &mut self,
        slugs: impl IntoIterator<Item = &'s Slug>,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let slugs: Vec<&Slug> = slugs.into_iter().collect();
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(select_items!(" WHERE slug IN ("));
        let mut list = query.separated(", ");
        for slug in slugs {
            list.push_bind(slug.as_str());
        }
        list.push_unseparated(") ORDER BY name ASC, slug ASC");

        let rows = query
            .build_query_as::<ItemRow>()
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().filter_map(ItemRow::into_item).collect())
    }

    /// Number of items per category, in category order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_counts(&mut self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let counts = sqlx::query_as(
            "SELECT category, COUNT(*) FROM items GROUP BY category ORDER BY category ASC",
        )
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(counts)
    }
}

/// Insert items, updating existing rows with the same slug.
///
/// Runs in one transaction: either every item is written or none is.
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails.
pub async fn upsert_items(
    conn: &mut SqliteConnection,
    items: &[MenuItem],
) -> Result<u64, RepositoryError> {
    let mut tx = conn.begin().await?;
    let mut written = 0;

    for item in items {
        let result = sqlx::query(
            r"
            INSERT INTO items (slug, name, category, energy_kcal, fat_g, sat_fat_g, carbs_g,
                               sugars_g, fiber_g, protein_g, salt_g, serving_label)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT (slug) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                energy_kcal = excluded.energy_kcal,
                fat_g = excluded.fat_g,
                sat_fat_g = excluded.sat_fat_g,
                carbs_g = excluded.carbs_g,
                sugars_g = excluded.sugars_g,
                fiber_g = excluded.fiber_g,
                protein_g = excluded.protein_g,
                salt_g = excluded.salt_g,
                serving_label = excluded.serving_label
            ",
        )
        .bind(&item.slug)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.energy_kcal)
        .bind(item.fat_g)
        .bind(item.sat_fat_g)
        .bind(item.carbs_g)
        .bind(item.sugars_g)
        .bind(item.fiber_g)
        .bind(item.protein_g)
        .bind(item.salt_g)
        .bind(&item.serving_label)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
pub(crate) mod tests {
    use super::*;
    use crate::db::{acquire, create_pool, ensure_schema};
    use sqlx::SqlitePool;

    pub(crate) fn menu_item(slug: &str, name: &str, category: &str, kcal: i64) -> MenuItem {
        MenuItem {
            slug: Slug::parse(slug).unwrap(),
            name: name.to_string(),
            category: category.to_string(),
            energy_kcal: kcal,
            fat_g: 10.0,
            sat_fat_g: 4.0,
            carbs_g: 30.0,
            sugars_g: 6.0,
            fiber_g: 2.0,
            protein_g: 12.5,
            salt_g: 1.25,
            serving_label: "1 szt.".to_string(),
        }
    }

    pub(crate) fn sample_menu() -> Vec<MenuItem> {
        vec![
            menu_item("big-mac", "Big Mac", "classic", 503),
            menu_item("cheeseburger", "Cheeseburger", "classic", 300),
            menu_item("fries-m", "Frytki średnie", "fries", 337),
            menu_item("fries-s", "Frytki małe", "fries", 231),
            menu_item("cola", "Coca-Cola", "beverages", 170),
            menu_item("mcflurry", "McFlurry Oreo", "desserts", 372),
        ]
    }

    pub(crate) async fn seeded_pool() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let mut conn = acquire(&pool).await.unwrap();
        ensure_schema(&mut conn).await.unwrap();
        upsert_items(&mut conn, &sample_menu()).await.unwrap();
        drop(conn);
        pool
    }

    fn slugs(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_categories_distinct_and_sorted() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let categories = ItemRepository::new(&mut conn)
            .list_categories()
            .await
            .unwrap();

        assert_eq!(categories, ["beverages", "classic", "desserts", "fries"]);
    }

    #[tokio::test]
    async fn test_list_items_without_filter_returns_all_sorted() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let items = ItemRepository::new(&mut conn)
            .list_items(&ItemFilter::all())
            .await
            .unwrap();

        assert_eq!(items.len(), 6);
        assert!(items.is_sorted_by(|a, b| a.name <= b.name));
    }

    #[tokio::test]
    async fn test_list_items_by_category() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let items = ItemRepository::new(&mut conn)
            .list_items(&ItemFilter::new(Some("fries"), None))
            .await
            .unwrap();

        assert_eq!(slugs(&items), ["fries-s", "fries-m"]);
    }

    #[tokio::test]
    async fn test_list_items_by_query_is_case_insensitive() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let items = ItemRepository::new(&mut conn)
            .list_items(&ItemFilter::new(None, Some("ŚREDNIE")))
            .await
            .unwrap();

        assert_eq!(slugs(&items), ["fries-m"]);
    }

    #[tokio::test]
    async fn test_list_items_filters_combine() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();
        let mut repo = ItemRepository::new(&mut conn);

        for (category, query) in [
            (Some("classic"), Some("burger")),
            (Some("fries"), Some("mac")),
            (None, Some("mc")),
            (Some("desserts"), None),
        ] {
            let filter = ItemFilter::new(category, query);
            let items = repo.list_items(&filter).await.unwrap();
            assert!(items.iter().all(|item| filter.matches(item)));
            assert!(items.is_sorted_by(|a, b| a.name <= b.name));

            let expected = sample_menu()
                .into_iter()
                .filter(|item| filter.matches(item))
                .count();
            assert_eq!(items.len(), expected, "{filter:?}");
        }
    }

    #[tokio::test]
    async fn test_list_items_skips_rows_with_bad_slugs() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let mut conn = acquire(&pool).await.unwrap();
        // Older databases allow NULL slugs.
        sqlx::raw_sql(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, \
             category TEXT NOT NULL, energy_kcal INTEGER NOT NULL, fat_g REAL NOT NULL, \
             sat_fat_g REAL NOT NULL, carbs_g REAL NOT NULL, sugars_g REAL NOT NULL, \
             fiber_g REAL NOT NULL, protein_g REAL NOT NULL, salt_g REAL NOT NULL, \
             slug TEXT UNIQUE, serving_label TEXT NOT NULL)",
        )
        .execute(&mut *conn)
        .await
        .unwrap();
        upsert_items(&mut conn, &sample_menu()).await.unwrap();

        let long = "x".repeat(Slug::MAX_LENGTH + 1);
        for slug in [Some(""), Some(long.as_str()), None] {
            sqlx::query(
                "INSERT INTO items (slug, name, category, energy_kcal, fat_g, sat_fat_g, \
                 carbs_g, sugars_g, fiber_g, protein_g, salt_g, serving_label) \
                 VALUES (?1, 'Broken', 'classic', 1, 0, 0, 0, 0, 0, 0, 0, '1 szt.')",
            )
            .bind(slug)
            .execute(&mut *conn)
            .await
            .unwrap();
        }

        let mut repo = ItemRepository::new(&mut conn);
        let all = repo.list_items(&ItemFilter::all()).await.unwrap();
        let classic = repo
            .list_items(&ItemFilter::new(Some("classic"), None))
            .await
            .unwrap();

        assert_eq!(all.len(), 6);
        assert_eq!(slugs(&classic), ["big-mac", "cheeseburger"]);
    }

    #[tokio::test]
    async fn test_list_items_unknown_category_is_empty() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let items = ItemRepository::new(&mut conn)
            .list_items(&ItemFilter::new(Some("sauces"), None))
            .await
            .unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_slugs_skips_unknown() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();
        let wanted = [
            Slug::parse("mcflurry").unwrap(),
            Slug::parse("ghost").unwrap(),
            Slug::parse("cola").unwrap(),
        ];

        let items = ItemRepository::new(&mut conn)
            .find_by_slugs(&wanted)
            .await
            .unwrap();

        assert_eq!(slugs(&items), ["cola", "mcflurry"]);
    }

    #[tokio::test]
    async fn test_find_by_slugs_empty_input() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let items = ItemRepository::new(&mut conn)
            .find_by_slugs(std::iter::empty())
            .await
            .unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_slug() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let mut changed = menu_item("cola", "Coca-Cola Zero", "beverages", 2);
        changed.sugars_g = 0.0;
        upsert_items(&mut conn, &[changed]).await.unwrap();

        let items = ItemRepository::new(&mut conn)
            .find_by_slugs(&[Slug::parse("cola").unwrap()])
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Coca-Cola Zero");
        assert_eq!(items[0].energy_kcal, 2);
        assert_eq!(items[0].sugars_g, 0.0);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(total, 6);
    }

    #[tokio::test]
    async fn test_category_counts() {
        let pool = seeded_pool().await;
        let mut conn = acquire(&pool).await.unwrap();

        let counts = ItemRepository::new(&mut conn)
            .category_counts()
            .await
            .unwrap();

        assert_eq!(
            counts,
            [
                ("beverages".to_string(), 1),
                ("classic".to_string(), 2),
                ("desserts".to_string(), 1),
                ("fries".to_string(), 2),
            ]
        );
    }
}
