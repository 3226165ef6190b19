//! hotfix_lookup tool implementation.
//!
//! Synchronous lookups against the string table preloaded at startup.

use hotfix_client::LocalStrings;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the hotfix_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotfixLookupParams {
    /// Strings to look up.
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LookupResult {
    pub text: String,
    pub replacement: String,
    pub replaced: bool,
}

/// Output from the hotfix_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotfixLookupOutput {
    pub results: Vec<LookupResult>,
}

/// Implementation of the hotfix_lookup tool.
pub fn lookup_impl(strings: &LocalStrings, params: HotfixLookupParams) -> Result<CallToolResult, McpError> {
    let results = params
        .texts
        .into_iter()
        .map(|text| {
            let replacement = strings.lookup(&text).into_owned();
            let replaced = replacement != text;
            LookupResult { text, replacement, replaced }
        })
        .collect();

    json_result(&HotfixLookupOutput { results })
}
