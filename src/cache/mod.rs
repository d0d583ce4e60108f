//! Durable memoization of outbound lookups.
//!
//! Entries are keyed by the exact query string: no trimming, no case folding.
//! `"Example Club, NSW"` and `"example club, NSW"` are different keys. Callers
//! already append the state and country, so fuzzy keys would trade precision
//! for coverage.
//!
//! Only successful lookups are stored. A failing query is retried on the next
//! run.

mod pool;

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error_handling::CacheError;

pub use pool::{init_cache_pool_with_path, init_memory_pool};

/// Result of [`ResultCache::get_or_compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLookup<T> {
    pub value: T,
    /// `true` when served from storage without invoking the computation.
    pub hit: bool,
}

/// Persistent query → value cache backed by SQLite.
///
/// Concurrent `get_or_compute` calls for the same key are single-flight: the
/// second caller waits for the first and then reads its stored value.
pub struct ResultCache {
    pool: SqlitePool,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResultCache {
    /// Opens the cache file at `path`, creating it if needed.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        let pool = init_cache_pool_with_path(path).await?;
        Ok(Self::with_pool(pool))
    }

    /// A non-durable cache, for tests and dry runs.
    pub async fn in_memory() -> Result<Self, CacheError> {
        let pool = init_memory_pool().await?;
        Ok(Self::with_pool(pool))
    }

    fn with_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Reads the stored value for `query`, if any.
    pub async fn get<T: DeserializeOwned>(&self, query: &str) -> Result<Option<T>, CacheError> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM geocode_cache WHERE query = ?")
                .bind(query)
                .fetch_optional(&self.pool)
                .await?;

        payload
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| CacheError::Corrupt {
                    query: query.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Stores `value` under `query`, replacing any previous entry.
    pub async fn put<T: Serialize>(&self, query: &str, value: &T) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value).map_err(CacheError::Encode)?;
        sqlx::query(
            "INSERT INTO geocode_cache (query, payload, cached_at_ms) VALUES (?, ?, ?)
             ON CONFLICT(query) DO UPDATE SET
                payload = excluded.payload,
                cached_at_ms = excluded.cached_at_ms",
        )
        .bind(query)
        .bind(payload)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Number of stored entries.
    pub async fn len(&self) -> Result<u64, CacheError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM geocode_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len().await? == 0)
    }

    /// Returns the stored value for `query`, or runs `compute` and stores its
    /// successful result before returning it.
    ///
    /// A failed computation is returned unchanged and nothing is stored.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        query: &str,
        compute: F,
    ) -> Result<CacheLookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(query).await? {
            return Ok(CacheLookup { value, hit: true });
        }

        let key_lock = self.key_lock(query);
        let guard = key_lock.lock().await;
        let outcome = self.compute_once(query, compute).await;
        drop(guard);
        self.release_key(query, &key_lock);
        outcome
    }

    async fn compute_once<T, E, F, Fut>(&self, query: &str, compute: F) -> Result<CacheLookup<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Another caller may have stored it while we waited for the key
        if let Some(value) = self.get(query).await? {
            return Ok(CacheLookup { value, hit: true });
        }

        let value = compute().await?;
        self.put(query, &value).await?;
        Ok(CacheLookup { value, hit: false })
    }

    fn key_lock(&self, query: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(in_flight.entry(query.to_string()).or_default())
    }

    fn release_key(&self, query: &str, key_lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Map entry plus our handle: nobody else is waiting
        if Arc::strong_count(key_lock) <= 2 {
            in_flight.remove(query);
        }
    }
}
