pub mod cache;
pub mod changelog;
pub mod cli;
pub mod diff;
pub mod error;
pub mod forge;
pub mod lockfile;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod result;

pub use result::Result;
