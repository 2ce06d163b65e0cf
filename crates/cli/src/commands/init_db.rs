//! Schema setup.

use mcd_calories_web::db;

use super::{CommandError, connect};

/// Create the `items` table if it is missing. Existing data is untouched.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the statement fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let mut conn = db::acquire(&pool).await?;

    db::ensure_schema(&mut conn).await?;

    tracing::info!("Items table ready");
    Ok(())
}
