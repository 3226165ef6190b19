//! Core types and shared functionality for hotfix resolution.
//!
//! This crate provides:
//! - Namespaced cache with SQLite backend and stale-while-revalidate reads
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedFunction, Freshness, Lookup, RefreshPolicy};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
