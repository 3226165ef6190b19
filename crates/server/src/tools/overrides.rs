//! hotfix_overrides tool implementation.
//!
//! Reports the features known to be broken in the running build.

use std::collections::BTreeMap;

use hotfix_client::Hotfixes;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// A broken feature as reported by the tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BrokenFeatureOutput {
    pub feature_id: String,
    pub related_issue: String,
    pub unaffected_version: Option<String>,
}

/// Output from the hotfix_overrides tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotfixOverridesOutput {
    /// Version the overrides were resolved for.
    pub running_version: String,
    /// Whether the running build is a development build (no overrides applied).
    pub development: bool,
    /// Option keys forced to `false`.
    pub overrides: BTreeMap<String, bool>,
    /// The broken features behind the overrides.
    pub features: Vec<BrokenFeatureOutput>,
}

/// Implementation of the hotfix_overrides tool.
pub async fn overrides_impl(hotfixes: &Hotfixes) -> Result<CallToolResult, McpError> {
    let overrides = hotfixes.feature_overrides().await;
    let features = hotfixes.local_hotfixes().await;

    let env = hotfixes.environment();
    let output = HotfixOverridesOutput {
        running_version: env.version.clone(),
        development: env.is_development(),
        overrides,
        features: features
            .into_iter()
            .map(|f| BrokenFeatureOutput {
                feature_id: f.feature_id,
                related_issue: f.related_issue,
                unaffected_version: f.unaffected_version,
            })
            .collect(),
    };

    json_result(&output)
}
