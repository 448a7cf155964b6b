//! Parser for pnpm-lock.yaml files.
//!
//! pnpm changed its package key encoding in lockfile version 9. Older
//! lockfiles use `/name/version` keys with an optional `_peerSuffix`, newer
//! ones use `name@version`. Both eras are handled, selected by comparing the
//! document's `lockfileVersion` against the threshold.

use indexmap::IndexMap;
use log::*;
use serde::Deserialize;

use super::{InstalledPackage, InstalledPackages};
use crate::result::Result;

/// Lockfile version that introduced `name@version` package keys.
const DUAL_SCHEME_THRESHOLD: f64 = 9.0;

#[derive(Debug, Deserialize)]
struct PnpmLockfile {
    #[serde(rename = "lockfileVersion", default)]
    lockfile_version: Option<LockfileVersion>,
    #[serde(default)]
    packages: Option<IndexMap<String, serde_yml::Value>>,
}

/// `lockfileVersion` is a number in some revisions and a numeric string in
/// others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LockfileVersion {
    Number(f64),
    Text(String),
}

impl LockfileVersion {
    fn as_number(&self) -> f64 {
        match self {
            Self::Number(number) => *number,
            Self::Text(text) => text.parse().unwrap_or_default(),
        }
    }
}

/// Parse pnpm-lock.yaml text into installed packages.
///
/// A document without a `packages` map yields an empty mapping: nothing is
/// locked, which is not an error.
pub fn parse(text: &str) -> Result<InstalledPackages> {
    let lockfile: PnpmLockfile = serde_yml::from_str(text)?;

    let mut pkgs = InstalledPackages::new();
    let Some(packages) = lockfile.packages else {
        return Ok(pkgs);
    };

    let lockfile_version = lockfile
        .lockfile_version
        .map(|version| version.as_number())
        .unwrap_or_default();

    for key in packages.keys() {
        let Some((name, version)) = parse_package_key(key, lockfile_version)
        else {
            debug!("skipping unrecognized pnpm package key: {key}");
            continue;
        };

        pkgs.insert(
            name.clone(),
            InstalledPackage { name, version },
        );
    }

    Ok(pkgs)
}

fn parse_package_key(
    key: &str,
    lockfile_version: f64,
) -> Option<(String, String)> {
    if lockfile_version >= DUAL_SCHEME_THRESHOLD {
        // Example: @popperjs/core@2.11.8
        let (name, version) = key.rsplit_once('@')?;
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), version.to_string()))
    } else {
        // Example: /@popperjs/core/2.11.5_react@18.0.0
        let stripped = key.split('_').next().unwrap_or(key);
        let parts: Vec<&str> = stripped.split('/').collect();
        if parts.len() < 3 || !parts[0].is_empty() {
            return None;
        }
        let version = parts[parts.len() - 1].to_string();
        let name = parts[1..parts.len() - 1].join("/");
        Some((name, version))
    }
}
