//! Remotely distributed hotfixes.
//!
//! Three resources are fetched from the hotfix host, each cached independently:
//!
//! | namespace          | resource                | max age | stale tolerance |
//! |--------------------|-------------------------|---------|-----------------|
//! | `broken-features`  | `broken-features.csv`   | 6h      | 30d             |
//! | `style-hotfixes`   | `style/<version>.css`   | 6h      | 300d            |
//! | `strings-hotfixes` | `strings.json`          | 6h      | 30d             |
//!
//! The application side ([`Hotfixes::feature_overrides`], [`inject_style_patch`],
//! [`LocalStrings`]) never fails: resolution errors are logged and treated as
//! "no hotfix".

mod apply;
pub mod strings;
pub mod style;

use std::collections::BTreeMap;
use std::sync::Arc;

use hotfix_core::{AppConfig, CacheDb, CachedFunction, Error, RefreshPolicy};
use serde::{Deserialize, Serialize};

use crate::fetch::ResourceSource;
use crate::parse::{compare_versions, parse_csv};

pub use apply::feature_option_key;
pub use strings::LocalStrings;
pub use style::{HtmlPage, StyleTarget, inject_style_patch};

pub const BROKEN_FEATURES: &str = "broken-features";
pub const STYLE_HOTFIXES: &str = "style-hotfixes";
pub const STRINGS_HOTFIXES: &str = "strings-hotfixes";

/// Version reported by local development builds.
pub const DEVELOPMENT_VERSION: &str = "0.0.0";

/// A feature known to be broken, as listed in `broken-features.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenFeature {
    pub feature_id: String,
    pub related_issue: String,
    /// First version in which the feature works again.
    pub unaffected_version: Option<String>,
}

/// Replacement strings keyed by their original text.
pub type StringTable = BTreeMap<String, String>;

/// Signals about the running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub version: String,
    pub development: bool,
    pub enterprise: bool,
}

impl Environment {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into(), development: false, enterprise: false }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            version: config.running_version.clone(),
            development: config.development,
            enterprise: config.enterprise,
        }
    }

    /// Development builds are flagged explicitly or report version `0.0.0`.
    pub fn is_development(&self) -> bool {
        self.development || self.version == DEVELOPMENT_VERSION
    }
}

/// Refresh policies for the three hotfix resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotfixPolicies {
    pub features: RefreshPolicy,
    pub style: RefreshPolicy,
    pub strings: RefreshPolicy,
}

impl Default for HotfixPolicies {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for HotfixPolicies {
    fn from(config: &AppConfig) -> Self {
        Self {
            features: config.features_policy(),
            style: config.style_policy(),
            strings: config.strings_policy(),
        }
    }
}

/// Keep rows that name a feature and an issue, and whose fix has not shipped
/// in `running_version` yet.
pub fn still_broken(rows: &[Vec<String>], running_version: &str) -> Vec<BrokenFeature> {
    rows.iter()
        .filter_map(|row| {
            let feature_id = row.first().filter(|s| !s.is_empty())?;
            let related_issue = row.get(1).filter(|s| !s.is_empty())?;
            let unaffected_version = row.get(2).filter(|s| !s.is_empty());

            if let Some(fixed_in) = unaffected_version
                && compare_versions(fixed_in, running_version).is_le()
            {
                return None;
            }

            Some(BrokenFeature {
                feature_id: feature_id.clone(),
                related_issue: related_issue.clone(),
                unaffected_version: unaffected_version.cloned(),
            })
        })
        .collect()
}

/// The cached hotfix resources for one running build.
#[derive(Debug, Clone)]
pub struct Hotfixes {
    broken_features: CachedFunction<(), Vec<BrokenFeature>>,
    style: CachedFunction<String, String>,
    strings: CachedFunction<(), StringTable>,
    env: Environment,
}

impl Hotfixes {
    pub fn new(source: Arc<dyn ResourceSource>, db: CacheDb, env: Environment, policies: HotfixPolicies) -> Self {
        let features_source = Arc::clone(&source);
        let running_version = env.version.clone();
        let broken_features = CachedFunction::new(BROKEN_FEATURES, db.clone(), policies.features, move |()| {
            let source = Arc::clone(&features_source);
            let running_version = running_version.clone();
            async move {
                let rows = match source.fetch_text("broken-features.csv").await? {
                    Some(content) => parse_csv(&content),
                    None => Vec::new(),
                };
                Ok::<_, Error>(still_broken(&rows, &running_version))
            }
        });

        let style_source = Arc::clone(&source);
        let style = CachedFunction::new(STYLE_HOTFIXES, db.clone(), policies.style, move |version: String| {
            let source = Arc::clone(&style_source);
            async move { Ok::<_, Error>(source.fetch_text(&format!("style/{version}.css")).await?.unwrap_or_default()) }
        })
        .with_cache_key(|_| String::new());

        let strings = CachedFunction::new(STRINGS_HOTFIXES, db, policies.strings, move |()| {
            let source = Arc::clone(&source);
            async move {
                let table = match source.fetch_text("strings.json").await? {
                    Some(json) if !json.trim().is_empty() => serde_json::from_str::<StringTable>(&json)?,
                    _ => StringTable::new(),
                };
                Ok::<_, Error>(table)
            }
        });

        Self { broken_features, style, strings, env }
    }

    pub fn from_config(source: Arc<dyn ResourceSource>, db: CacheDb, config: &AppConfig) -> Self {
        Self::new(source, db, Environment::from_config(config), HotfixPolicies::from(config))
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Features still broken in the running build.
    pub fn broken_features(&self) -> &CachedFunction<(), Vec<BrokenFeature>> {
        &self.broken_features
    }

    /// CSS patch for a version; a single entry is kept regardless of version.
    pub fn style(&self) -> &CachedFunction<String, String> {
        &self.style
    }

    /// String-replacement table.
    pub fn strings(&self) -> &CachedFunction<(), StringTable> {
        &self.strings
    }

    /// Clear every hotfix namespace.
    pub async fn clear(&self) -> Result<u64, Error> {
        Ok(self.broken_features.clear().await? + self.style.clear().await? + self.strings.clear().await?)
    }
}
