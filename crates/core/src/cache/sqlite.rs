//! SQLite-backed cache adapter.
//!
//! Entries live in the `cache_entries` table with an absolute expiry time.
//! Reads ignore expired rows; [`SqliteCache::purge_expired`] reclaims them.

use async_trait::async_trait;
use chrono::Duration;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_rusqlite::{Connection, params};

use super::CacheStore;
use crate::Error;
use crate::clock::{Clock, SystemClock, to_db_timestamp};
use crate::db;

/// Cache handle over a tokio-rusqlite connection.
#[derive(Clone)]
pub struct SqliteCache {
    conn: Connection,
    open: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SqliteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCache").field("open", &self.is_available()).finish_non_exhaustive()
    }
}

fn unavailable(err: Error) -> Error {
    match err {
        Error::CacheUnavailable(_) => err,
        other => Error::CacheUnavailable(other.to_string()),
    }
}

impl SqliteCache {
    /// Open a cache database at the specified path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = db::open(path).await.map_err(unavailable)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory cache for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = db::open_in_memory().await.map_err(unavailable)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self { conn, open: Arc::new(AtomicBool::new(true)), clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Close the underlying connection.
    ///
    /// Every clone of this handle reports unavailable afterwards.
    pub async fn close(&self) -> Result<(), Error> {
        self.open.store(false, Ordering::SeqCst);
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| Error::CacheUnavailable(format!("failed to close cache: {e}")))
    }

    /// Delete expired entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let now = to_db_timestamp(self.clock.now());
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(|e| unavailable(Error::from(e)))
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    fn is_available(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        let now = to_db_timestamp(self.clock.now());
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare("SELECT value FROM cache_entries WHERE key = ?1 AND expires_at > ?2")?;

                let result = stmt.query_row(params![key, now], |row| row.get(0));

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(|e| unavailable(Error::from(e)))
    }

    /// Insert or replace an entry.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();

        let now = self.clock.now();
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| Error::InvalidInput(format!("cache ttl out of range: {ttl_seconds}s")))?;
        let stored_at = to_db_timestamp(now);
        let expires_at = to_db_timestamp(expires_at);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (key, value, stored_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        stored_at = excluded.stored_at,
                        expires_at = excluded.expires_at",
                    params![key, value, stored_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| unavailable(Error::from(e)))
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(|e| unavailable(Error::from(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    async fn cache_with_clock() -> (SqliteCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        let cache = SqliteCache::open_in_memory().await.unwrap().with_clock(clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (cache, _) = cache_with_clock().await;
        cache.set("user:1:notes", "[]", 3600).await.unwrap();
        assert_eq!(cache.get("user:1:notes").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (cache, _) = cache_with_clock().await;
        assert!(cache.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_value() {
        let (cache, _) = cache_with_clock().await;
        cache.set("k", r#"{"old":1}"#, 3600).await.unwrap();
        cache.set("k", r#"{"new":2}"#, 3600).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some(r#"{"new":2}"#));
    }

    #[tokio::test]
    async fn test_ttl_boundary() {
        let (cache, clock) = cache_with_clock().await;
        cache.set("k", "v", 3600).await.unwrap();

        clock.advance(Duration::seconds(3599));
        assert!(cache.get("k").await.unwrap().is_some());

        clock.advance(Duration::seconds(2));
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (cache, _) = cache_with_clock().await;
        cache.set("k", "v", 3600).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (cache, clock) = cache_with_clock().await;
        cache.set("expiring", "{}", 1).await.unwrap();
        cache.set("fresh", "{}", 3600).await.unwrap();

        clock.advance(Duration::seconds(2));

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(cache.get("expiring").await.unwrap().is_none());
        assert!(cache.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_closed_cache_is_unavailable() {
        let (cache, _) = cache_with_clock().await;
        let other = cache.clone();
        cache.close().await.unwrap();

        assert!(!other.is_available());
        assert!(matches!(other.get("k").await, Err(Error::CacheUnavailable(_))));
        assert!(matches!(other.delete("k").await, Err(Error::CacheUnavailable(_))));
    }
}
