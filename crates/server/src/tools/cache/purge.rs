//! cache_purge tool implementation.
//!
//! Purges cache entries by namespace or age.

use chrono::{Duration, Utc};
use hotfix_core::CacheDb;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::super::json_result;
use crate::error::ToolError;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove every entry in this namespace.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Purge entries older than this many days.
    #[serde(default)]
    pub older_than_days: Option<i64>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: &CacheDb, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.namespace.is_none() && params.older_than_days.is_none() {
        return Err(ToolError::InvalidInput("At least one of namespace or older_than_days must be specified".into()).into());
    }

    let cutoff = match params.older_than_days {
        Some(days) if days < 0 => {
            return Err(ToolError::InvalidInput(format!("older_than_days must not be negative, got {days}")).into());
        }
        Some(days) => Some(
            Duration::try_days(days)
                .and_then(|age| Utc::now().checked_sub_signed(age))
                .ok_or_else(|| ToolError::InvalidInput(format!("older_than_days is out of range: {days}")))?,
        ),
        None => None,
    };

    let mut deleted_total = 0u64;

    if let Some(namespace) = params.namespace.as_deref() {
        deleted_total += cache.clear_namespace(namespace).await?;
    }

    if let Some(cutoff) = cutoff {
        deleted_total += cache.purge_older_than(cutoff).await?;
    }

    tracing::info!(deleted = deleted_total, namespace = ?params.namespace, "purged cache entries");

    json_result(&CachePurgeOutput { deleted: deleted_total })
}
