//! Implements the Forge trait for GitHub

use async_trait::async_trait;
use color_eyre::eyre::{OptionExt, eyre};
use log::*;
use octocrab::Octocrab;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    forge::{
        config::RemoteConfig,
        traits::Forge,
        types::{FileTreeEntry, TreeEntryKind},
    },
    report::COMMENT_HEADING,
    result::Result,
};

#[derive(Debug, Deserialize)]
struct GitTreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: TreeEntryKind,
}

#[derive(Debug, Deserialize)]
struct GitTreeResponse {
    tree: Vec<GitTreeItem>,
}

/// GitHub forge implementation using Octocrab with personal access token
/// authentication.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with token authentication and API base URL
    /// derived from the configured host and scheme.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = format!("{}://api.{}", config.scheme, config.host);
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?
            .build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
        })
    }

    /// Browse URL base for entries of the tree at `tree_reference`. The git
    /// revision syntax `branch:subpath` maps onto the `blob/branch/subpath`
    /// URL layout.
    fn browse_base(
        &self,
        owner: &str,
        repo: &str,
        tree_reference: &str,
    ) -> String {
        let revision_path = tree_reference.replace(':', "/");
        format!(
            "{}://{}/{owner}/{repo}/blob/{revision_path}",
            self.config.scheme, self.config.host
        )
    }
}

#[async_trait]
impl Forge for Github {
    async fn base_ref_of_pull(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
    ) -> Result<String> {
        let pr = self.instance.pulls(owner, repo).get(pull_number).await?;
        Ok(pr.base.ref_field)
    }

    async fn fetch_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>> {
        debug!("fetching {owner}/{repo}/{path} at {reference}");

        let result = self
            .instance
            .repos(owner, repo)
            .get_content()
            .path(path)
            .r#ref(reference)
            .send()
            .await;

        match result {
            Err(octocrab::Error::GitHub { source, .. }) => {
                if source.status_code == StatusCode::NOT_FOUND {
                    debug!("no file found for path: {path}");
                    Ok(None)
                } else {
                    let msg = format!(
                        "error getting contents for path: {path}, status: {}",
                        source.status_code
                    );
                    error!("{msg}");
                    Err(eyre!(msg))
                }
            }
            Err(err) => {
                let msg = format!(
                    "encountered error getting file contents for path: {path}: {err}"
                );
                error!("{msg}");
                Err(eyre!(msg))
            }
            Ok(mut data) => {
                let items = data.take_items();

                if items.is_empty() {
                    debug!("no file found for path: {path}");
                    return Ok(None);
                }

                if let Some(content) = items[0].decoded_content() {
                    Ok(Some(content))
                } else {
                    Err(eyre!("failed to decode file content for path: {path}"))
                }
            }
        }
    }

    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let repository = self.instance.repos(owner, repo).get().await?;
        let err_msg =
            format!("failed to find default branch for repo: {owner}/{repo}");
        repository.default_branch.ok_or_eyre(err_msg)
    }

    async fn get_tree(
        &self,
        owner: &str,
        repo: &str,
        tree_reference: &str,
    ) -> Result<Vec<FileTreeEntry>> {
        let endpoint = format!(
            "{}/repos/{owner}/{repo}/git/trees/{tree_reference}",
            self.base_uri
        );

        let response: GitTreeResponse =
            self.instance.get(endpoint, None::<&()>).await?;

        debug!("tree entries: {}", response.tree.len());

        let browse_base = self.browse_base(owner, repo, tree_reference);
        let entries = response
            .tree
            .into_iter()
            .map(|item| FileTreeEntry {
                url: format!("{browse_base}/{}", item.path),
                path: item.path,
                kind: item.kind,
            })
            .collect();

        Ok(entries)
    }

    async fn replace_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<()> {
        let comments = self
            .instance
            .issues(owner, repo)
            .list_comments(issue_number)
            .send()
            .await?;

        let existing = comments.items.into_iter().find(|comment| {
            comment
                .body
                .as_deref()
                .is_some_and(|text| text.starts_with(COMMENT_HEADING))
        });

        if let Some(comment) = existing {
            info!("updating existing comment on issue #{issue_number}");
            self.instance
                .issues(owner, repo)
                .update_comment(comment.id, body)
                .await?;
        } else {
            info!("creating comment on issue #{issue_number}");
            self.instance
                .issues(owner, repo)
                .create_comment(issue_number, body)
                .await?;
        }

        Ok(())
    }
}
