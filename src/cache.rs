//! Persistent changelog URL lookup cache scoped to a pull request.
//!
//! Changelog discovery costs two remote calls per package, so discovered
//! URLs are cached across CI runs for the same pull request. The cache is a
//! pure performance optimization: the pipeline must succeed even if caching
//! permanently fails, which drives the degradation policy in
//! [`CachedJson::save`].

pub mod backend;

use indexmap::IndexMap;
use log::*;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::{
    cache::backend::{CacheBackend, CachePersistError},
    changelog::{self, RepoReference},
    forge::traits::Forge,
    registry::ResolvedPackage,
    result::Result,
};

/// Default logical name for the changelog cache, used as the store key
/// prefix.
pub const DEFAULT_CACHE_NAME: &str = "changelog";

/// Flat JSON document copied in and out of a keyed backend store.
struct CachedJson {
    name: String,
    issue_number: u64,
    work_dir: PathBuf,
}

impl CachedJson {
    fn new(
        name: impl Into<String>,
        issue_number: u64,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            issue_number,
            work_dir: work_dir.into(),
        }
    }

    fn local_file(&self) -> PathBuf {
        self.work_dir.join(format!("{}.json", self.name))
    }

    fn cache_key(&self) -> String {
        format!("{}-{}", self.name, self.issue_number)
    }

    fn prefix_key(&self) -> String {
        format!("{}-", self.name)
    }

    async fn load(
        &self,
        backend: &dyn CacheBackend,
    ) -> Result<IndexMap<String, String>> {
        let local_file = self.local_file();
        let hit = backend
            .restore(&local_file, &self.cache_key(), &[self.prefix_key()])
            .await?;

        if !hit {
            debug!("no cache snapshot for key: {}", self.cache_key());
            return Ok(IndexMap::new());
        }

        let content = tokio::fs::read_to_string(&local_file).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Serialize and persist the full map under the exact cache key.
    /// Validation failures propagate; a reservation by a concurrent writer
    /// and every other failure are logged and swallowed.
    async fn save(
        &self,
        backend: &dyn CacheBackend,
        data: &IndexMap<String, String>,
    ) -> Result<()> {
        let local_file = self.local_file();
        let content = serde_json::to_string(data)?;
        tokio::fs::write(&local_file, content).await?;

        match backend.persist(&local_file, &self.cache_key()).await {
            Ok(()) => Ok(()),
            Err(err @ CachePersistError::Validation(_)) => Err(err.into()),
            Err(CachePersistError::Reservation(message)) => {
                info!("{message}");
                Ok(())
            }
            Err(CachePersistError::Other(message)) => {
                warn!("{message}");
                Ok(())
            }
        }
    }
}

/// Process-scoped package name -> changelog URL cache.
///
/// The in-memory map is lazily materialized by [`restore`](Self::restore)
/// and shared across concurrent lookups behind a mutex. Keys are package
/// names only: a package's changelog location convention is assumed stable
/// across versions, so a cached URL is reused even when the version changed.
pub struct ChangelogCache {
    body: Mutex<Option<IndexMap<String, String>>>,
    json: CachedJson,
}

impl ChangelogCache {
    pub fn new(issue_number: u64) -> Self {
        Self::with_work_dir(DEFAULT_CACHE_NAME, issue_number, ".")
    }

    pub fn with_work_dir(
        name: impl Into<String>,
        issue_number: u64,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            body: Mutex::new(None),
            json: CachedJson::new(name, issue_number, work_dir),
        }
    }

    /// Materialize the in-memory map from the backend. Idempotent: a second
    /// call while already materialized is a no-op. A total store miss starts
    /// the cache empty, which is not an error.
    pub async fn restore(&self, backend: &dyn CacheBackend) -> Result<()> {
        let mut body = self.body.lock().await;
        if body.is_some() {
            return Ok(());
        }

        *body = Some(self.json.load(backend).await?);
        Ok(())
    }

    /// Persist the in-memory map. No-op when `restore` was never called.
    pub async fn persist(&self, backend: &dyn CacheBackend) -> Result<()> {
        let body = self.body.lock().await;
        let Some(data) = body.as_ref() else {
            return Ok(());
        };

        self.json.save(backend, data).await
    }

    /// Get-or-populate: a cached URL is returned as-is; on a miss the
    /// changelog is located remotely (falling back to the repository's
    /// releases listing) and the result populates the cache. A package with
    /// no parseable repository reference contributes nothing.
    pub async fn get_url_or_find(
        &self,
        package: &ResolvedPackage,
        forge: &dyn Forge,
    ) -> Option<String> {
        {
            let body = self.body.lock().await;
            if let Some(data) = body.as_ref()
                && let Some(url) = data.get(&package.name)
            {
                debug!("changelog cache hit: {}", package.name);
                return Some(url.clone());
            }
        }

        let Some(repository_url) = package.repository_url.as_deref() else {
            debug!("npm package has no repository url: {}", package.name);
            return None;
        };
        let reference = RepoReference::parse(repository_url)?;

        let url = match changelog::locate(&reference, forge).await {
            Some(url) => url,
            None => reference.release_url(),
        };

        let mut body = self.body.lock().await;
        if let Some(data) = body.as_mut() {
            data.insert(package.name.clone(), url.clone());
        }

        Some(url)
    }
}
