//! Lockfile parsing into a normalized package -> installed version mapping.
//!
//! Supported formats are selected purely by the configured lockfile path
//! suffix: `yarn.lock` (the flow-style v1 format) and `pnpm-lock.yaml`.

mod pnpm;
mod yarn;

use indexmap::IndexMap;

use crate::{error::BotError, result::Result};

/// One dependency's resolved install version as recorded in a lockfile
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

/// Mapping from package name to installed package, preserving the lockfile's
/// declaration order. Duplicate names overwrite earlier entries.
pub type InstalledPackages = IndexMap<String, InstalledPackage>;

/// Parse raw lockfile text, dispatching on the lockfile path suffix.
pub fn parse(text: &str, path: &str) -> Result<InstalledPackages> {
    if path.ends_with("yarn.lock") {
        yarn::parse(text)
    } else if path.ends_with("pnpm-lock.yaml") {
        pnpm::parse(text)
    } else {
        Err(BotError::unsupported_format(path).into())
    }
}
