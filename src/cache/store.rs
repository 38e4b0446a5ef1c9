//! On-disk cache storage
//!
//! Writes go to a uniquely named temporary file in the cache directory and are
//! published with a rename, so a concurrent reader either sees the complete
//! entry or no entry at all.

use crate::cache::{CacheError, CacheResult, ResourceKey};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Content-addressed cache rooted at a single directory
///
/// Only this type writes into its directory.
#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
}

impl ContentCache {
    /// Creates a cache rooted at `root`
    ///
    /// The directory is created lazily on the first `store`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a cache at `<workspace>/<cache_dir>`
    pub fn in_workspace(workspace: &Path, cache_dir: &str) -> Self {
        Self::new(workspace.join(cache_dir))
    }

    /// The cache directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `key`, whether or not it exists
    pub fn entry_path(&self, key: &ResourceKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Returns true if an entry exists for `key`
    pub async fn has(&self, key: &ResourceKey) -> bool {
        fs::metadata(self.entry_path(key))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Opens the entry for `key` for reading
    ///
    /// # Returns
    ///
    /// * `Ok(File)` - The entry, positioned at its start
    /// * `Err(CacheError::NotFound)` - No entry exists
    /// * `Err(CacheError::Io)` - The entry exists but could not be opened
    pub async fn open(&self, key: &ResourceKey) -> CacheResult<File> {
        File::open(self.entry_path(key))
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => CacheError::NotFound(key.clone()),
                _ => CacheError::Io {
                    key: key.clone(),
                    source,
                },
            })
    }

    /// Reads the full content of the entry for `key`
    pub async fn read(&self, key: &ResourceKey) -> CacheResult<Vec<u8>> {
        let mut file = self.open(key).await?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .await
            .map_err(|source| CacheError::Io {
                key: key.clone(),
                source,
            })?;
        Ok(content)
    }

    /// Stores the content of `reader` as the entry for `key`
    ///
    /// Intermediate directories are created as needed. If an entry already
    /// exists it is replaced by the new bytes; callers only store after a miss,
    /// so in practice this only happens when two fetches of the same identity
    /// race, and both write the same content.
    ///
    /// # Returns
    ///
    /// The number of bytes written
    pub async fn store<R>(&self, key: &ResourceKey, reader: &mut R) -> CacheResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let io_err = |source| CacheError::Io {
            key: key.clone(),
            source,
        };

        fs::create_dir_all(&self.root).await.map_err(io_err)?;

        let temp_path = self.temp_path(key);
        let written = match write_file(&temp_path, reader).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(io_err(e));
            }
        };

        if let Err(e) = fs::rename(&temp_path, self.entry_path(key)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(io_err(e));
        }

        tracing::debug!(key = %key, bytes = written, "stored cache entry");
        Ok(written)
    }

    /// Stores a byte slice as the entry for `key`
    pub async fn store_bytes(&self, key: &ResourceKey, content: &[u8]) -> CacheResult<u64> {
        let mut reader = content;
        self.store(key, &mut reader).await
    }

    fn temp_path(&self, key: &ResourceKey) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), n))
    }
}

async fn write_file<R>(path: &Path, reader: &mut R) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = File::create(path).await?;
    let written = tokio::io::copy(reader, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
