//! Directory-backed byte store
//!
//! Each key is stored as one file, sharded by the first two characters of the
//! key: `<root>/ab/abcdef....bin`. Writes go to a uniquely named temporary file
//! in the same shard and are renamed into place, so readers never observe a
//! partially written entry.

use crate::storage::traits::{check_key, CacheStore, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Byte store keeping one file per key under a root directory
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    write_seq: AtomicU64,
}

impl DirectoryStore {
    /// Creates the store, creating the root directory if needed
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_seq: AtomicU64::new(0),
        })
    }

    fn shard_dir(&self, key: &str) -> PathBuf {
        self.root.join(&key[..2])
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.shard_dir(key).join(format!("{}.bin", key))
    }
}

#[async_trait]
impl CacheStore for DirectoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        check_key(key)?;
        match tokio::fs::read(self.entry_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        check_key(key)?;
        let shard = self.shard_dir(key);
        tokio::fs::create_dir_all(&shard).await?;

        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = shard.join(format!(".{}.{}.{}.tmp", key, std::process::id(), seq));
        tokio::fs::write(&tmp, value).await?;

        if let Err(e) = tokio::fs::rename(&tmp, self.entry_path(key)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
