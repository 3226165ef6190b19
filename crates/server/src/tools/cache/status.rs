//! cache_status tool implementation.
//!
//! Lists stored entries with their age and freshness under the policy of the
//! namespace they belong to.

use chrono::Utc;
use hotfix_client::Hotfixes;
use hotfix_core::cache::{EntryMeta, RefreshPolicy, parse_timestamp};
use hotfix_core::{CacheDb, Freshness};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::super::json_result;

/// Parameters for the cache_status tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusParams {
    /// Restrict the listing to one namespace.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A stored entry with its age.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntryStatus {
    #[serde(flatten)]
    pub meta: EntryMeta,
    /// Seconds since the entry was produced. None if the timestamp is unreadable.
    pub age_seconds: Option<u64>,
    /// None for namespaces the server does not manage.
    pub freshness: Option<Freshness>,
}

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    pub entries: Vec<EntryStatus>,
}

fn policy_for(hotfixes: &Hotfixes, namespace: &str) -> Option<RefreshPolicy> {
    [
        (hotfixes.broken_features().name(), hotfixes.broken_features().policy()),
        (hotfixes.style().name(), hotfixes.style().policy()),
        (hotfixes.strings().name(), hotfixes.strings().policy()),
    ]
    .into_iter()
    .find(|(name, _)| *name == namespace)
    .map(|(_, policy)| policy)
}

/// Implementation of the cache_status tool.
pub async fn status_impl(
    cache: &CacheDb, hotfixes: &Hotfixes, params: CacheStatusParams,
) -> Result<CallToolResult, McpError> {
    let now = Utc::now();
    let entries = cache
        .list_entries(params.namespace.as_deref())
        .await?
        .into_iter()
        .map(|meta| {
            let age = parse_timestamp(&meta.fetched_at)
                .ok()
                .map(|ts| (now - ts).to_std().unwrap_or_default());
            let freshness = policy_for(hotfixes, &meta.namespace).zip(age).map(|(p, age)| p.classify(age));
            EntryStatus { age_seconds: age.map(|a| a.as_secs()), freshness, meta }
        })
        .collect();

    json_result(&CacheStatusOutput { entries })
}
