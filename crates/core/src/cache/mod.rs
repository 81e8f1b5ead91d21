//! Key-value cache adapters.
//!
//! The note query service only talks to the [`CacheStore`] trait. Two
//! backends are provided:
//!
//! - [`SqliteCache`]: persistent, expiry checked on read
//! - [`MemoryCache`]: process-local, used by tests and single-process setups
//!
//! Every backend failure surfaces as `CacheUnavailable`; adapters never
//! fall back silently.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::Error;
use crate::note::UserId;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Lifetime of the per-user note list entry.
pub const NOTES_CACHE_TTL_SECS: u64 = 3600;

/// Cache key holding the full note list of `user_id`.
pub fn notes_cache_key(user_id: UserId) -> String {
    format!("user:{user_id}:notes")
}

/// Key-value cache with per-entry time-to-live.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether the backend connection is established.
    fn is_available(&self) -> bool;

    /// Fetch a live value. Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store a value that expires after `ttl_seconds`.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), Error>;

    /// Remove a value. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), Error>;
}
