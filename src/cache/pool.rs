//! Cache database connection pool management.
//!
//! Initializes the SQLite pool backing the lookup cache with:
//! - WAL mode enabled
//! - Automatic database file (and parent directory) creation
//! - The cache schema applied on open

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;

use log::{debug, error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error_handling::CacheError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS geocode_cache (
    query TEXT PRIMARY KEY NOT NULL,
    payload TEXT NOT NULL,
    cached_at_ms INTEGER NOT NULL
)";

/// Opens (creating if needed) the cache database at `db_path`.
pub async fn init_cache_pool_with_path(db_path: &Path) -> Result<SqlitePool, CacheError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CacheError::FileCreationError(e.to_string()))?;
    }

    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => info!("Created lookup cache at {}", db_path.display()),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!("Reusing lookup cache at {}", db_path.display())
        }
        Err(e) => {
            error!("Failed to create cache file: {e}");
            return Err(CacheError::FileCreationError(e.to_string()));
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to connect to cache database: {e}");
            CacheError::SqlError(e)
        })?;

    apply_schema(&pool).await?;
    Ok(pool)
}

/// Opens a private in-memory cache. Entries vanish with the pool.
pub async fn init_memory_pool() -> Result<SqlitePool, CacheError> {
    // One long-lived connection: every new in-memory connection is a new database
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CacheError> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
