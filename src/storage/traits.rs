//! Storage traits and error types
//!
//! This module defines the byte-store interface the fetch cache is built on
//! and the associated error type.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A persistent key-value byte store
///
/// Keys are fixed-length, filesystem-safe strings (lowercase hex digests).
/// Implementations must tolerate concurrent reads and writes of distinct keys
/// from multiple tasks; concurrent writes of the same key resolve as
/// last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the bytes stored under `key`, or `None` if absent
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: &[u8]) -> StorageResult<()>;
}

/// Rejects keys that are not lowercase hex, so they can be used as file names
pub(crate) fn check_key(key: &str) -> StorageResult<()> {
    let valid = key.len() >= 4
        && key
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
