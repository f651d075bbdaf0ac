//! Disk-backed response cache
//!
//! One file per URL under a fixed directory. Entries are never expired or
//! rewritten by the crawler; clearing the directory is the only way to force
//! fresh data.

use crate::cache::cache_key;
use crate::CacheError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistent store of raw response bodies keyed by request URL
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    /// Wraps an existing directory without touching the filesystem
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the directory if needed and checks that it is writable
    ///
    /// # Returns
    ///
    /// * `Ok(ResponseCache)` - The directory exists and accepts writes
    /// * `Err(CacheError::Unusable)` - The directory cannot be created or written
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache = Self::new(dir);
        let unusable = |source| CacheError::Unusable {
            path: cache.dir.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(&cache.dir)
            .await
            .map_err(unusable)?;

        let probe = cache.dir.join(".write-probe");
        tokio::fs::write(&probe, b"").await.map_err(unusable)?;
        tokio::fs::remove_file(&probe).await.map_err(unusable)?;

        tracing::debug!("Response cache ready at {}", cache.dir.display());
        Ok(cache)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the cached body for `url`
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.html", cache_key(url)))
    }

    /// Returns the cached body for `url`, if any
    ///
    /// Unreadable entries are logged and treated as misses so the caller
    /// falls back to the network.
    pub async fn get(&self, url: &str) -> Option<String> {
        let path = self.path_for(url);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Some(body),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable cache entry {} for {}: {}",
                    path.display(),
                    url,
                    e
                );
                None
            }
        }
    }

    /// Stores the body for `url`, replacing any previous entry
    pub async fn put(&self, url: &str, body: &str) -> Result<(), CacheError> {
        tokio::fs::write(self.path_for(url), body)
            .await
            .map_err(|source| CacheError::Write {
                url: url.to_string(),
                source,
            })
    }
}
