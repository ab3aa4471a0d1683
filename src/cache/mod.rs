//! TTL fetch cache
//!
//! Successful page extractions are stored as JSON through a
//! [`CacheStore`], keyed by the hex SHA-256 of the page URL. Entries carry
//! their write time; the TTL is supplied by the reader, so an entry written
//! under one TTL can be read under another.
//!
//! Cache failures never fail a fetch: unreadable entries and store errors
//! are reported as misses and write failures are logged.

use crate::model::PageContent;
use crate::storage::{CacheStore, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// A stored extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub url_hash: String,
    pub payload: PageContent,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry stamped with the current time
    pub fn new(url: &str, payload: PageContent) -> Self {
        Self {
            url: url.to_string(),
            url_hash: cache_key(url),
            payload,
            stored_at: Utc::now(),
        }
    }

    /// Returns true if the entry is older than `ttl` at `now`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.stored_at > ttl,
            Err(_) => false,
        }
    }
}

/// Computes the cache key for a URL (64 lowercase hex characters)
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Content-addressed page cache with read-time expiry
#[derive(Clone)]
pub struct FetchCache {
    store: Arc<dyn CacheStore>,
}

impl FetchCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Looks up a fresh cached extraction for `url`
    ///
    /// # Returns
    ///
    /// * `Some(PageContent)` - A valid entry younger than `ttl`
    /// * `None` - Missing, expired, corrupt or unreadable
    pub async fn get(&self, url: &str, ttl: Duration) -> Option<PageContent> {
        let key = cache_key(url);

        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", url, e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding corrupt cache entry for {}: {}", url, e);
                return None;
            }
        };

        if entry.url != url || entry.url_hash != key {
            tracing::warn!("Cache entry {} does not belong to {}", key, url);
            return None;
        }

        if entry.is_expired(ttl, Utc::now()) {
            tracing::debug!("Cache entry for {} expired (stored {})", url, entry.stored_at);
            return None;
        }

        tracing::debug!("Cache hit for {}", url);
        Some(entry.payload)
    }

    /// Stores an extraction for `url`, replacing any previous entry
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn put(&self, url: &str, content: &PageContent) {
        if let Err(e) = self.try_put(url, content).await {
            tracing::warn!("Cache write failed for {}: {}", url, e);
        }
    }

    async fn try_put(&self, url: &str, content: &PageContent) -> Result<(), StorageError> {
        let entry = CacheEntry::new(url, content.clone());
        let bytes = serde_json::to_vec(&entry)?;
        self.store.put(&entry.url_hash, &bytes).await
    }
}
