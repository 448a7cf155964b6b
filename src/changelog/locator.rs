//! Resolves a changelog URL by probing a repository's file tree.

use log::*;
use regex::Regex;
use std::collections::HashMap;

use super::SORTED_FILENAMES;
use crate::forge::{
    traits::Forge,
    types::{FileTreeEntry, TreeEntryKind},
};

const SUBTREE_URL_PATTERN: &str =
    r"https://github\.com/([^/]+)/([^/]+)/tree/[^/]+/(.+)$";
const ROOT_URL_PATTERN: &str = r"https://github\.com/([^/]+)/([^#/]+)/?";

/// A resolved locator for a source-control repository. Subtree references
/// point into a monorepo subfolder and probe that directory instead of the
/// repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoReference {
    Root {
        owner: String,
        name: String,
    },
    Subtree {
        owner: String,
        name: String,
        subpath: String,
    },
}

impl RepoReference {
    /// Parse a declared repository URL. The two patterns are mutually
    /// exclusive: the subtree pattern is tried first since every subtree URL
    /// also matches the root pattern. Unparseable URLs yield `None` and the
    /// changelog lookup is silently skipped.
    pub fn parse(url: &str) -> Option<Self> {
        let subtree_regex = Regex::new(SUBTREE_URL_PATTERN).ok()?;
        let root_regex = Regex::new(ROOT_URL_PATTERN).ok()?;

        if let Some(caps) = subtree_regex.captures(url) {
            debug!("repository subtree: {url}");
            return Some(Self::Subtree {
                owner: caps[1].to_string(),
                name: normalize_repo_name(&caps[2]),
                subpath: caps[3].to_string(),
            });
        }

        let caps = root_regex.captures(url)?;
        debug!("repository root: {url}");
        Some(Self::Root {
            owner: caps[1].to_string(),
            name: normalize_repo_name(&caps[2]),
        })
    }

    pub fn owner(&self) -> &str {
        match self {
            Self::Root { owner, .. } | Self::Subtree { owner, .. } => owner,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Root { name, .. } | Self::Subtree { name, .. } => name,
        }
    }

    /// Git tree reference to probe: the branch itself for root references,
    /// `branch:subpath` for subtree references.
    pub fn tree_reference(&self, branch: &str) -> String {
        match self {
            Self::Root { .. } => branch.to_string(),
            Self::Subtree { subpath, .. } => format!("{branch}:{subpath}"),
        }
    }

    /// Generic releases-listing URL, always constructible.
    pub fn release_url(&self) -> String {
        format!("https://github.com/{}/{}/releases", self.owner(), self.name())
    }
}

/// Strips a trailing `.git` suffix from a repository name.
fn normalize_repo_name(name: &str) -> String {
    name.strip_suffix(".git").unwrap_or(name).to_string()
}

/// Probe the referenced directory for the best-ranked changelog-like file
/// and return its browse URL.
///
/// Remote failures are not retried and never fail the run: they are logged
/// and reported as "no changelog found", deferring to the release-URL
/// fallback.
pub async fn locate(
    reference: &RepoReference,
    forge: &dyn Forge,
) -> Option<String> {
    let owner = reference.owner();
    let name = reference.name();

    let branch = match forge.default_branch(owner, name).await {
        Ok(branch) => branch,
        Err(err) => {
            debug!("failed to get default branch for {owner}/{name}: {err}");
            return None;
        }
    };
    debug!("{name} default branch: {branch}");

    let tree_reference = reference.tree_reference(&branch);
    let entries = match forge.get_tree(owner, name, &tree_reference).await {
        Ok(entries) => entries,
        Err(err) => {
            debug!("failed to get tree {owner}/{name} at {tree_reference}: {err}");
            return None;
        }
    };
    debug!("{name} entries: {}", entries.len());

    find_changelog_entry(entries).map(|entry| entry.url)
}

/// Pick the best-ranked blob entry. Duplicate paths keep the last entry.
fn find_changelog_entry(entries: Vec<FileTreeEntry>) -> Option<FileTreeEntry> {
    let mut by_path: HashMap<String, FileTreeEntry> = HashMap::new();
    for entry in entries {
        by_path.insert(entry.path.clone(), entry);
    }

    for filename in SORTED_FILENAMES.iter() {
        if let Some(entry) = by_path.get(*filename)
            && entry.kind == TreeEntryKind::Blob
        {
            return Some(entry.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::traits::MockForge;

    fn blob(path: &str) -> FileTreeEntry {
        FileTreeEntry {
            path: path.to_string(),
            url: format!("https://github.com/owner/repo/blob/main/{path}"),
            kind: TreeEntryKind::Blob,
        }
    }

    #[test]
    fn parses_root_reference() {
        let reference =
            RepoReference::parse("https://github.com/owner/repo/").unwrap();
        assert_eq!(
            reference,
            RepoReference::Root {
                owner: "owner".into(),
                name: "repo".into()
            }
        );
    }

    #[test]
    fn parses_reference_embedded_in_registry_url() {
        let reference =
            RepoReference::parse("git+https://github.com/owner/repo.git")
                .unwrap();
        assert_eq!(reference.owner(), "owner");
        assert_eq!(reference.name(), "repo");
    }

    #[test]
    fn parses_subtree_reference() {
        let reference = RepoReference::parse(
            "https://github.com/owner/monorepo/tree/main/packages/core",
        )
        .unwrap();
        assert_eq!(
            reference,
            RepoReference::Subtree {
                owner: "owner".into(),
                name: "monorepo".into(),
                subpath: "packages/core".into(),
            }
        );
    }

    #[test]
    fn unparseable_url_yields_none() {
        assert!(RepoReference::parse("https://example.com/foo").is_none());
        assert!(RepoReference::parse("not a url").is_none());
    }

    #[test]
    fn builds_release_url() {
        let reference =
            RepoReference::parse("https://github.com/owner/repo.git").unwrap();
        assert_eq!(
            reference.release_url(),
            "https://github.com/owner/repo/releases"
        );
    }

    #[test]
    fn subtree_tree_reference_includes_subpath() {
        let reference = RepoReference::parse(
            "https://github.com/owner/monorepo/tree/main/packages/core",
        )
        .unwrap();
        assert_eq!(
            reference.tree_reference("develop"),
            "develop:packages/core"
        );
    }

    #[tokio::test]
    async fn selects_highest_ranked_filename() {
        let mut forge = MockForge::new();
        forge
            .expect_default_branch()
            .returning(|_, _| Ok("main".to_string()));
        forge.expect_get_tree().returning(|_, _, _| {
            Ok(vec![blob("changelog.md"), blob("CHANGELOG.md")])
        });

        let reference =
            RepoReference::parse("https://github.com/owner/repo").unwrap();
        let url = locate(&reference, &forge).await.unwrap();
        assert!(url.ends_with("/CHANGELOG.md"));
    }

    #[tokio::test]
    async fn directories_are_never_selected() {
        let mut forge = MockForge::new();
        forge
            .expect_default_branch()
            .returning(|_, _| Ok("main".to_string()));
        forge.expect_get_tree().returning(|_, _, _| {
            Ok(vec![
                FileTreeEntry {
                    path: "CHANGELOG.md".into(),
                    url: "https://github.com/owner/repo/tree/main/CHANGELOG.md"
                        .into(),
                    kind: TreeEntryKind::Tree,
                },
                blob("HISTORY.md"),
            ])
        });

        let reference =
            RepoReference::parse("https://github.com/owner/repo").unwrap();
        let url = locate(&reference, &forge).await.unwrap();
        assert!(url.ends_with("/HISTORY.md"));
    }

    #[tokio::test]
    async fn no_candidate_yields_none() {
        let mut forge = MockForge::new();
        forge
            .expect_default_branch()
            .returning(|_, _| Ok("main".to_string()));
        forge
            .expect_get_tree()
            .returning(|_, _, _| Ok(vec![blob("README.md")]));

        let reference =
            RepoReference::parse("https://github.com/owner/repo").unwrap();
        assert!(locate(&reference, &forge).await.is_none());
    }

    #[tokio::test]
    async fn remote_failures_are_swallowed() {
        let mut forge = MockForge::new();
        forge
            .expect_default_branch()
            .returning(|_, _| Err(color_eyre::eyre::eyre!("boom")));

        let reference =
            RepoReference::parse("https://github.com/owner/repo").unwrap();
        assert!(locate(&reference, &forge).await.is_none());
    }
}
