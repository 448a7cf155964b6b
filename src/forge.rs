//! Remote forge API abstraction and the GitHub implementation.

pub mod config;
pub mod github;
pub mod traits;
pub mod types;
