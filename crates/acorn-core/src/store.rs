//! Keyed-expiry store capability.
//!
//! The rate limiter's counters live in an externally owned store with
//! automatic key expiry (the hosting environment typically backs this with
//! its script cache or a Redis-alike). The trait is injected so tests can
//! substitute the in-process [`MemoryStore`].
//!
//! Concurrency contract: the hosting environment may run the pipeline
//! concurrently for distinct events, so every counter mutation goes through
//! [`ExpiryStore::fetch_add`], a single atomic read-modify-write. Two
//! concurrent invocations for one sender must not both observe a prior
//! count of zero.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::BotError;

#[async_trait]
pub trait ExpiryStore: Send + Sync {
    /// Returns the live value at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, BotError>;

    /// Stores `value` at `key`, expiring after `ttl` when given.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), BotError>;

    /// Atomically increments the counter at `key`, (re)arming its expiry,
    /// and returns the count prior to the increment. A missing or expired
    /// key counts as zero.
    async fn fetch_add(&self, key: &str, ttl: Duration) -> Result<u64, BotError>;
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

/// In-process store used by tests and single-node deployments.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpiryStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BotError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| BotError::Store("store mutex poisoned".to_string()))?;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), BotError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| BotError::Store("store mutex poisoned".to_string()))?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn fetch_add(&self, key: &str, ttl: Duration) -> Result<u64, BotError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| BotError::Store("store mutex poisoned".to_string()))?;
        let prior = entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.value.parse::<u64>().ok())
            .unwrap_or(0);
        entries.insert(
            key.to_string(),
            Entry {
                value: (prior + 1).to_string(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_put_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.put("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entries_read_as_absent() {
        let store = MemoryStore::new();
        store
            .put("k", "v", Some(Duration::from_millis(0)))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_add_counts_from_zero() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        assert_eq!(store.fetch_add("hits", ttl).await.unwrap(), 0);
        assert_eq!(store.fetch_add("hits", ttl).await.unwrap(), 1);
        assert_eq!(store.fetch_add("hits", ttl).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_add_restarts_after_expiry() {
        let store = MemoryStore::new();
        store.fetch_add("hits", Duration::from_millis(0)).await.unwrap();
        assert_eq!(
            store.fetch_add("hits", Duration::from_secs(60)).await.unwrap(),
            0
        );
    }
}
