//! Menu statistics.

use mcd_calories_web::db::{self, ItemRepository};

use super::{CommandError, connect};

/// Log the number of items per category.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = db::acquire(&pool).await?;

    let counts = ItemRepository::new(&mut conn).category_counts().await?;
    let total: i64 = counts.iter().map(|(_, count)| count).sum();

    tracing::info!("Menu Statistics");
    tracing::info!("===============");
    tracing::info!("Total items: {total}");
    tracing::info!("By category:");
    for (category, count) in &counts {
        tracing::info!("  {category}: {count}");
    }

    Ok(())
}
