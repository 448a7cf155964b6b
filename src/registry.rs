//! npm registry metadata resolution.
//!
//! Registry failures are never fatal: a package that cannot be resolved
//! simply contributes no changelog URL and falls through to the report's
//! npmjs fallback.

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::result::Result;

/// Public npm registry base URL.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Narrow view of a package's registry metadata: only the declared source
/// repository URL survives the boundary decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub repository_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PackageMetadata {
    #[serde(default)]
    repository: Option<RepositoryInfo>,
}

/// Resolves package names against a package registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Registry: Send + Sync {
    /// Resolve registry metadata for a package. Any registry error is
    /// logged and swallowed, yielding `None`.
    async fn resolve_package(&self, name: &str) -> Option<ResolvedPackage>;
}

/// npm registry client over plain HTTP with optional bearer token
/// authentication for private packages.
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl NpmRegistry {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<SecretString>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn package_url(&self, name: &str) -> String {
        // the registry accepts scoped names either way but the encoded
        // slash is unambiguous
        format!("{}/{}", self.base_url, name.replace('/', "%2F"))
    }

    async fn fetch_metadata(&self, name: &str) -> Result<PackageMetadata> {
        let mut request = self.client.get(self.package_url(name));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Registry for NpmRegistry {
    async fn resolve_package(&self, name: &str) -> Option<ResolvedPackage> {
        match self.fetch_metadata(name).await {
            Ok(metadata) => {
                let repository_url =
                    metadata.repository.and_then(|repo| repo.url);
                debug!("npm package: name={name} repo={repository_url:?}");
                Some(ResolvedPackage {
                    name: name.to_string(),
                    repository_url,
                })
            }
            Err(err) => {
                debug!("failed to fetch npm package info: {name}, {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_repository_url_from_metadata() {
        let body = r#"{
            "name": "react",
            "dist-tags": {"latest": "18.2.0"},
            "repository": {
                "type": "git",
                "url": "git+https://github.com/facebook/react.git"
            }
        }"#;

        let metadata: PackageMetadata = serde_json::from_str(body).unwrap();
        assert_eq!(
            metadata.repository.and_then(|r| r.url).as_deref(),
            Some("git+https://github.com/facebook/react.git")
        );
    }

    #[test]
    fn tolerates_missing_repository_field() {
        let metadata: PackageMetadata =
            serde_json::from_str(r#"{"name": "left-pad"}"#).unwrap();
        assert!(metadata.repository.is_none());
    }

    #[test]
    fn encodes_scoped_package_names() {
        let registry = NpmRegistry::new(DEFAULT_REGISTRY_URL, None);
        assert_eq!(
            registry.package_url("@scope/pkg"),
            "https://registry.npmjs.org/@scope%2Fpkg"
        );
        assert_eq!(
            registry.package_url("lodash"),
            "https://registry.npmjs.org/lodash"
        );
    }
}
