//! Wires the lockfile diff, registry resolution, changelog discovery, and
//! lookup cache into a single pipeline run.

use indexmap::IndexMap;
use log::*;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::{
    cache::{ChangelogCache, backend::CacheBackend},
    diff::{self, UpdatedPackage},
    error::BotError,
    forge::traits::Forge,
    lockfile::{self, InstalledPackages},
    registry::{Registry, ResolvedPackage},
    report::{self, PackageReport},
    result::Result,
};

/// Identity of the pull request the bot runs for.
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub head_ref: String,
}

/// Single-run pipeline: fetch and parse both lockfile snapshots, diff them,
/// resolve registry metadata, discover changelog URLs through the cache, and
/// produce the ordered report rows.
pub struct Orchestrator {
    forge: Arc<dyn Forge>,
    registry: Arc<dyn Registry>,
    cache: Arc<ChangelogCache>,
    backend: Arc<dyn CacheBackend>,
    context: PullRequestContext,
    lockfile_path: String,
}

impl Orchestrator {
    pub fn new(
        forge: Arc<dyn Forge>,
        registry: Arc<dyn Registry>,
        cache: Arc<ChangelogCache>,
        backend: Arc<dyn CacheBackend>,
        context: PullRequestContext,
        lockfile_path: impl Into<String>,
    ) -> Self {
        Self {
            forge,
            registry,
            cache,
            backend,
            context,
            lockfile_path: lockfile_path.into(),
        }
    }

    /// Run the pipeline to completion. Only format and missing-input errors
    /// at the entry are fatal; downstream lookups degrade to rows without a
    /// changelog URL.
    pub async fn run(&self) -> Result<Vec<PackageReport>> {
        self.cache.restore(self.backend.as_ref()).await?;

        let (current, previous) = self.fetch_lockfiles().await?;
        let updates = diff::diff(&current, previous.as_ref());
        info!("{} updated packages", updates.len());

        let resolved = self.resolve_packages(&updates).await;
        let urls = self.find_changelog_urls(&updates, resolved).await;

        self.cache.persist(self.backend.as_ref()).await?;

        Ok(report::build_rows(&updates, &urls))
    }

    /// Fetch and parse the head and base lockfile snapshots. The two
    /// content fetches are independent and run concurrently. An absent base
    /// lockfile means it was newly added on this pull request.
    async fn fetch_lockfiles(
        &self,
    ) -> Result<(InstalledPackages, Option<InstalledPackages>)> {
        let PullRequestContext {
            owner,
            repo,
            number,
            head_ref,
        } = &self.context;

        let base_ref =
            self.forge.base_ref_of_pull(owner, repo, *number).await?;
        debug!("base ref for pull request #{number}: {base_ref}");

        let (current_text, previous_text) = tokio::join!(
            self.forge
                .fetch_content(owner, repo, &self.lockfile_path, head_ref),
            self.forge
                .fetch_content(owner, repo, &self.lockfile_path, &base_ref),
        );

        let current_text = current_text?.ok_or_else(|| {
            BotError::missing_current_lockfile(&self.lockfile_path, head_ref)
        })?;
        let current = lockfile::parse(&current_text, &self.lockfile_path)?;

        let previous = match previous_text? {
            Some(text) => Some(lockfile::parse(&text, &self.lockfile_path)?),
            None => None,
        };

        Ok((current, previous))
    }

    /// Resolve registry metadata for every updated package concurrently,
    /// restoring the diff's emission order afterwards.
    async fn resolve_packages(
        &self,
        updates: &[UpdatedPackage],
    ) -> Vec<Option<ResolvedPackage>> {
        let mut set = JoinSet::new();

        for (index, update) in updates.iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let name = update.name.clone();
            set.spawn(
                async move { (index, registry.resolve_package(&name).await) },
            );
        }

        let mut resolved: Vec<Option<ResolvedPackage>> =
            vec![None; updates.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, package)) => resolved[index] = package,
                Err(err) => warn!("registry lookup task failed: {err}"),
            }
        }

        resolved
    }

    /// Discover changelog URLs for all resolved packages concurrently
    /// through the shared cache.
    async fn find_changelog_urls(
        &self,
        updates: &[UpdatedPackage],
        resolved: Vec<Option<ResolvedPackage>>,
    ) -> IndexMap<String, String> {
        let mut set = JoinSet::new();

        for (index, package) in resolved.into_iter().enumerate() {
            let Some(package) = package else {
                continue;
            };
            let cache = Arc::clone(&self.cache);
            let forge = Arc::clone(&self.forge);
            set.spawn(async move {
                (index, cache.get_url_or_find(&package, forge.as_ref()).await)
            });
        }

        let mut urls: Vec<Option<String>> = vec![None; updates.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, url)) => urls[index] = url,
                Err(err) => warn!("changelog lookup task failed: {err}"),
            }
        }

        let mut by_name = IndexMap::new();
        for (update, url) in updates.iter().zip(urls) {
            if let Some(url) = url {
                by_name.insert(update.name.clone(), url);
            }
        }

        by_name
    }
}
