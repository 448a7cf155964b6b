//! CLI argument parsing and forge connection configuration.

use clap::Parser;
use color_eyre::eyre::eyre;
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::env;

use crate::{
    forge::config::RemoteConfig, registry::DEFAULT_REGISTRY_URL,
    result::Result,
};

/// Default directory used as the cache backing store.
pub const DEFAULT_CACHE_DIR: &str = ".npm-changelog-cache";

/// CLI arguments for the bot run.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// GitHub repository URL (https://github.com/owner/repo).
    #[arg(long)]
    pub github_repo: String,

    /// GitHub personal access token. Falls back to GITHUB_TOKEN env var.
    #[arg(long, default_value = "")]
    pub github_token: String,

    /// npm registry token for private packages. Falls back to NPM_TOKEN env
    /// var.
    #[arg(long, default_value = "")]
    pub npm_token: String,

    /// npm registry base URL.
    #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Number of the pull request the bot runs for.
    #[arg(long)]
    pub pull_number: u64,

    /// Git ref of the pull request head.
    #[arg(long)]
    pub head_ref: String,

    /// Path to the lockfile within the repository.
    #[arg(long, default_value = "yarn.lock")]
    pub lockfile_path: String,

    /// Directory used as the backing store for the lookup cache.
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: String,

    /// Print the report instead of posting a comment.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Enable debug logging.
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    /// Configure the remote repository connection from CLI arguments.
    pub fn get_remote(&self) -> Result<RemoteConfig> {
        let parsed = GitUrl::parse(&self.github_repo)?;

        validate_scheme(parsed.scheme)?;

        let mut token = self.github_token.clone();

        if token.is_empty()
            && let Some(parsed_token) = parsed.token
        {
            token = parsed_token;
        }

        if token.is_empty()
            && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
        {
            token = env_var_token;
        }

        if token.is_empty() {
            return Err(eyre!("must set github token"));
        }

        let host = parsed
            .host
            .ok_or(eyre!("unable to parse host from github repo"))?;

        let owner = parsed
            .owner
            .ok_or(eyre!("unable to parse owner from github repo"))?;

        Ok(RemoteConfig {
            host,
            scheme: parsed.scheme.to_string(),
            owner,
            repo: parsed.name,
            token: SecretString::from(token),
        })
    }

    /// Optional npm registry token, with NPM_TOKEN env var fallback.
    pub fn npm_token(&self) -> Option<SecretString> {
        let mut token = self.npm_token.clone();

        if token.is_empty()
            && let Ok(env_var_token) = env::var("NPM_TOKEN")
        {
            token = env_var_token;
        }

        if token.is_empty() {
            None
        } else {
            Some(SecretString::from(token))
        }
    }
}

/// Validate repository URL uses HTTP or HTTPS scheme.
fn validate_scheme(scheme: git_url_parse::Scheme) -> Result<()> {
    match scheme {
        git_url_parse::Scheme::Http => Ok(()),
        git_url_parse::Scheme::Https => Ok(()),
        _ => Err(eyre!(
            "only http and https schemes are supported for repo urls"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_args(repo: &str, token: &str) -> Args {
        Args {
            github_repo: repo.to_string(),
            github_token: token.to_string(),
            npm_token: "".into(),
            registry_url: DEFAULT_REGISTRY_URL.into(),
            pull_number: 1,
            head_ref: "refs/pull/1/merge".into(),
            lockfile_path: "yarn.lock".into(),
            cache_dir: DEFAULT_CACHE_DIR.into(),
            dry_run: false,
            debug: true,
        }
    }

    #[test]
    fn gets_github_remote() {
        let args = test_args(
            "https://github.com/github_owner/github_repo",
            "github_token",
        );

        let result = args.get_remote();
        assert!(result.is_ok());

        let remote = result.unwrap();
        assert_eq!(remote.owner, "github_owner");
        assert_eq!(remote.repo, "github_repo");
        assert_eq!(remote.host, "github.com");
    }

    #[test]
    fn only_supports_http_and_https_schemes() {
        let args =
            test_args("git@github.com:github_owner/github_repo", "token");

        let result = args.get_remote();
        assert!(result.is_err());
    }

    #[test]
    fn npm_token_is_optional() {
        let args = test_args("https://github.com/owner/repo", "token");
        assert!(args.npm_token.is_empty());
    }
}
