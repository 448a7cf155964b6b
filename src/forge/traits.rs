//! Traits related to remote forge APIs.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{forge::types::FileTreeEntry, result::Result};

/// Remote forge operations the pipeline depends on. Implementations are
/// expected to map "not found" responses for content lookups to `Ok(None)`
/// and propagate every other failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Base branch ref of a pull request.
    async fn base_ref_of_pull(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<String>;

    /// Decoded file content at a ref, or `None` when the path does not exist
    /// there.
    async fn fetch_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>>;

    /// Name of the repository's default branch.
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String>;

    /// Entries of the git tree at `tree_reference` (a branch name, or
    /// `branch:subpath` for a subdirectory).
    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_reference: &str,
    ) -> Result<Vec<FileTreeEntry>>;

    /// Update the bot's existing comment on the issue, or create one.
    async fn replace_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<()>;
}
