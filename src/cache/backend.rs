//! Cache backend abstraction and a local directory store.
//!
//! The core owns the flat JSON cache file; a backend only copies that file
//! in and out of a keyed store. Persist failures carry an explicit kind so
//! callers never have to match on error message text.

use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};
use thiserror::Error;

use crate::result::Result;

/// Longest accepted store key, matching typical CI cache services.
const MAX_KEY_LENGTH: usize = 512;

/// Persist failure kinds with distinct degradation policies: `Validation`
/// is fatal, `Reservation` (a concurrent writer owns the key) and `Other`
/// are logged and swallowed.
#[derive(Debug, Error)]
pub enum CachePersistError {
    #[error("invalid cache key: {0}")]
    Validation(String),

    #[error("cache already reserved for key: {0}")]
    Reservation(String),

    #[error("failed to persist cache: {0}")]
    Other(String),
}

/// Keyed snapshot store for the cache's local JSON file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Copy a previously persisted snapshot into `local_file`. Falls back to
    /// the most recent snapshot under any of `prefix_keys` when the exact
    /// key misses. Returns false when nothing matched.
    async fn restore(
        &self,
        local_file: &Path,
        exact_key: &str,
        prefix_keys: &[String],
    ) -> Result<bool>;

    /// Copy `local_file` into the store under `exact_key`.
    async fn persist(
        &self,
        local_file: &Path,
        exact_key: &str,
    ) -> std::result::Result<(), CachePersistError>;
}

/// Backend that stores snapshots as files in a directory. Keys behave like
/// CI cache keys: immutable once written, so persisting an existing key
/// reports a reservation failure.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn latest_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<PathBuf>> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }

            let modified = entry.metadata().await?.modified()?;
            if newest.as_ref().is_none_or(|(stamp, _)| modified > *stamp) {
                newest = Some((modified, entry.path()));
            }
        }

        Ok(newest.map(|(_, path)| path))
    }
}

fn validate_key(key: &str) -> std::result::Result<(), CachePersistError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && !key.contains(',')
        && !key.contains('/')
        && !key.contains('\\');

    if valid {
        Ok(())
    } else {
        Err(CachePersistError::Validation(format!(
            "keys must be non-empty, at most {MAX_KEY_LENGTH} characters, \
             and free of commas and path separators: {key}"
        )))
    }
}

#[async_trait]
impl CacheBackend for DirStore {
    async fn restore(
        &self,
        local_file: &Path,
        exact_key: &str,
        prefix_keys: &[String],
    ) -> Result<bool> {
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(false);
        }

        let exact = self.entry_path(exact_key);
        if tokio::fs::try_exists(&exact).await? {
            tokio::fs::copy(&exact, local_file).await?;
            return Ok(true);
        }

        for prefix in prefix_keys {
            if let Some(path) = self.latest_with_prefix(prefix).await? {
                tokio::fs::copy(&path, local_file).await?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn persist(
        &self,
        local_file: &Path,
        exact_key: &str,
    ) -> std::result::Result<(), CachePersistError> {
        validate_key(exact_key)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| CachePersistError::Other(err.to_string()))?;

        let target = self.entry_path(exact_key);
        let reserved = tokio::fs::try_exists(&target)
            .await
            .map_err(|err| CachePersistError::Other(err.to_string()))?;
        if reserved {
            return Err(CachePersistError::Reservation(format!(
                "another writer already owns cache key: {exact_key}"
            )));
        }

        tokio::fs::copy(local_file, &target)
            .await
            .map_err(|err| CachePersistError::Other(err.to_string()))?;

        Ok(())
    }
}
