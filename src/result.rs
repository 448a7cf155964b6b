//! Error handling and result types for npm-changelog-bot.
//!
//! Plumbing errors are reported through `color-eyre` for enhanced error
//! display with context chains. Failures the pipeline treats specially are
//! modeled as typed variants in [`crate::error`].

use color_eyre::eyre::Result as EyreResult;

/// Standard result type used throughout npm-changelog-bot.
pub type Result<T> = EyreResult<T>;
