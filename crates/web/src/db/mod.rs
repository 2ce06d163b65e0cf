//! Database operations for the menu `SQLite` database.
//!
//! ## Tables
//!
//! - `items` - Menu items with nutrition facts (read-only for the web flows)
//! - `tower_sessions` - Session storage, created by the session store
//!
//! Handlers take one connection per request with [`acquire`] and hand
//! `&mut` access to the repositories. The returned guard puts the connection
//! back into the pool when dropped, which covers early `?` returns too.

pub mod items;

use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection};

pub use items::ItemRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Schema for the `items` table.
///
/// Idempotent; never seeds data.
const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS items (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  category TEXT NOT NULL,
  energy_kcal INTEGER NOT NULL,
  fat_g REAL NOT NULL,
  sat_fat_g REAL NOT NULL,
  carbs_g REAL NOT NULL,
  sugars_g REAL NOT NULL,
  fiber_g REAL NOT NULL,
  protein_g REAL NOT NULL,
  salt_g REAL NOT NULL,
  slug TEXT NOT NULL UNIQUE,
  serving_label TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS items_category_idx ON items (category);
";

/// Create an `SQLite` connection pool.
///
/// The database file (and its parent directory) is created if missing.
/// In-memory databases get a single long-lived connection, since every
/// new connection would otherwise see its own empty database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    if !in_memory
        && let Some(parent) = options.get_filename().parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// Check out a connection for the duration of one request.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if no connection becomes available.
pub async fn acquire(pool: &SqlitePool) -> Result<PoolConnection<Sqlite>, RepositoryError> {
    Ok(pool.acquire().await?)
}

/// Create the `items` table if it does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the statement fails.
pub async fn ensure_schema(conn: &mut SqliteConnection) -> Result<(), RepositoryError> {
    sqlx::raw_sql(SCHEMA_SQL).execute(conn).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let mut conn = acquire(&pool).await.unwrap();

        ensure_schema(&mut conn).await.unwrap();
        ensure_schema(&mut conn).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_memory_pool_shares_one_database() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        {
            let mut conn = acquire(&pool).await.unwrap();
            ensure_schema(&mut conn).await.unwrap();
        }

        let mut conn = acquire(&pool).await.unwrap();
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'items'",
        )
        .fetch_one(&mut *conn)
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }
}
