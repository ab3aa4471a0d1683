//! Storage module for the persistent fetch cache
//!
//! This module provides the byte-store abstraction the cache is built on and
//! its two backends:
//! - `DirectoryStore`: one file per key under a sharded directory (default)
//! - `SqliteStore`: a single SQLite database file

mod directory;
mod schema;
mod sqlite;
mod traits;

pub use directory::DirectoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CacheStore, StorageError, StorageResult};

use crate::config::{CacheBackend, CacheConfig};
use std::path::Path;
use std::sync::Arc;

/// Opens the byte store selected by the cache configuration
///
/// # Arguments
///
/// * `config` - The cache configuration (backend and path)
///
/// # Returns
///
/// * `Ok(Arc<dyn CacheStore>)` - The opened store
/// * `Err(StorageError)` - The directory or database could not be created
pub fn open_store(config: &CacheConfig) -> StorageResult<Arc<dyn CacheStore>> {
    let path = Path::new(&config.path);
    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Directory => Arc::new(DirectoryStore::new(path)?),
        CacheBackend::Sqlite => Arc::new(SqliteStore::new(path)?),
    };
    tracing::debug!("Opened {:?} cache store at {}", config.backend, path.display());
    Ok(store)
}
