//! MCP tool implementations.
//!
//! This module contains all tools exposed by the hotfix server.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

pub mod cache;
pub mod lookup;
pub mod overrides;
pub mod style;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Serialize(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;

    use hotfix_client::{Environment, HotfixPolicies, Hotfixes, LocalStrings, ResourceSource};
    use hotfix_core::{CacheDb, Error};
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;

    use crate::handler::HotfixState;

    /// Serves fixed bodies by path; everything else is not found.
    pub struct StaticSource(pub HashMap<String, String>);

    #[async_trait::async_trait]
    impl ResourceSource for StaticSource {
        async fn fetch_text(&self, path: &str) -> Result<Option<String>, Error> {
            Ok(self.0.get(path).cloned())
        }
    }

    pub fn hotfixes_on(db: CacheDb, resources: &[(&str, &str)], env: Environment) -> Hotfixes {
        let source = StaticSource(resources.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect());
        Hotfixes::new(Arc::new(source), db, env, HotfixPolicies::default())
    }

    pub async fn hotfixes_with(resources: &[(&str, &str)], env: Environment) -> Hotfixes {
        hotfixes_on(CacheDb::open_in_memory().await.unwrap(), resources, env)
    }

    pub async fn state(resources: &[(&str, &str)]) -> Arc<HotfixState> {
        let db = CacheDb::open_in_memory().await.unwrap();
        let hotfixes = hotfixes_on(db.clone(), resources, Environment::new("1.5.0"));
        Arc::new(HotfixState { hotfixes, strings: LocalStrings::new(), db })
    }

    /// Decode the JSON text content of a tool result.
    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
