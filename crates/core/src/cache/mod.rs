//! SQLite-backed cache for remotely hosted hotfix data.
//!
//! This module provides a persistent, namespaced key-value store using SQLite
//! with async access via tokio-rusqlite, and the refresh-cached function built
//! on top of it. It supports:
//!
//! - Namespaced entries stamped with the time they were produced
//! - Stale-while-revalidate reads with background refresh
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod cached_fn;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use cached_fn::{CacheArg, CacheEntry, Cached, CachedFunction, Freshness, Lookup, RefreshPolicy};
pub use connection::CacheDb;
pub use entries::{EntryMeta, StoredEntry, format_timestamp, parse_timestamp};
