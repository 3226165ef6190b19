//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and purging the hotfix cache.

pub mod purge;
pub mod status;

pub use purge::{CachePurgeParams, purge_impl};
pub use status::{CacheStatusParams, status_impl};
