//! Typed errors for failures the pipeline treats specially.
//!
//! Everything downstream of a successfully parsed lockfile degrades to
//! partial results instead of failing the run. The variants here are the
//! fatal entry-point failures; recoverable cache persistence failures live in
//! [`crate::cache::backend::CachePersistError`].

use thiserror::Error;

/// Fatal pipeline errors.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("unsupported lockfile path: {0}")]
    UnsupportedFormat(String),

    #[error("no lockfile found at {path} for ref {reference}")]
    MissingCurrentLockfile { path: String, reference: String },
}

impl BotError {
    /// Create an unsupported-format error for a lockfile path.
    pub fn unsupported_format(path: impl Into<String>) -> Self {
        Self::UnsupportedFormat(path.into())
    }

    /// Create a missing-lockfile error for the head ref.
    pub fn missing_current_lockfile(
        path: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::MissingCurrentLockfile {
            path: path.into(),
            reference: reference.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = BotError::unsupported_format("package-lock.json");
        assert_eq!(
            err.to_string(),
            "unsupported lockfile path: package-lock.json"
        );

        let err = BotError::missing_current_lockfile("yarn.lock", "main");
        assert_eq!(
            err.to_string(),
            "no lockfile found at yarn.lock for ref main"
        );
    }

    #[test]
    fn test_error_helpers() {
        let err = BotError::unsupported_format("Gemfile.lock");
        assert!(matches!(err, BotError::UnsupportedFormat(_)));

        let err = BotError::missing_current_lockfile("yarn.lock", "main");
        assert!(matches!(err, BotError::MissingCurrentLockfile { .. }));
    }
}
