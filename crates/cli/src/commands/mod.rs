//! Subcommand implementations.

pub mod init_db;
pub mod seed;
pub mod stats;

use sqlx::SqlitePool;

use mcd_calories_web::config::AppConfig;
use mcd_calories_web::db::{self, RepositoryError};

/// Errors a subcommand can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid menu file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("{0} validation errors found")]
    Validation(usize),
}

/// Open the menu database named by the environment.
async fn connect() -> Result<SqlitePool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = AppConfig::database_url_from_env();
    tracing::info!(%database_url, "Connecting to database");

    Ok(db::create_pool(&database_url).await?)
}
