//! Client code for hotfix resolution.
//!
//! This crate provides the versioned fetcher for the hotfix host, the parsers
//! for hotfix data, and the cached hotfix resources built on `hotfix-core`.

pub mod fetch;
pub mod hotfix;
pub mod parse;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchConfig, HotfixFetcher, ResourceSource};
pub use hotfix::{
    BrokenFeature, Environment, HotfixPolicies, Hotfixes, HtmlPage, LocalStrings, StringTable, StyleTarget,
    inject_style_patch,
};
pub use parse::{compare_versions, parse_csv};
