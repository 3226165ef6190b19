//! hotfix_style tool implementation.
//!
//! Resolves the CSS patch for the running version and optionally applies it
//! to caller-supplied HTML.

use hotfix_client::{Hotfixes, HtmlPage};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for hotfix_style tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HotfixStyleParams {
    /// HTML document to patch (optional).
    #[serde(default)]
    pub html: Option<String>,
}

/// Output structure for hotfix_style tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HotfixStyleOutput {
    /// Version the patch was resolved for.
    pub running_version: String,
    /// The CSS patch; empty when none is defined or the build takes no style hotfixes.
    pub css: String,
    /// Whether the patch was injected into `html`.
    pub applied: bool,
    /// The patched document (only if html was given).
    pub html: Option<String>,
}

/// Implementation of the hotfix_style tool.
pub async fn style_impl(hotfixes: &Hotfixes, params: HotfixStyleParams) -> Result<CallToolResult, McpError> {
    let (applied, html) = match params.html {
        Some(html) => {
            let mut page = HtmlPage::new(html);
            let applied = hotfixes.apply_style_hotfixes(&mut page).await;
            (applied, Some(page.into_string()))
        }
        None => (false, None),
    };
    let css = hotfixes.active_style_patch().await;

    json_result(&HotfixStyleOutput { running_version: hotfixes.environment().version.clone(), css, applied, html })
}
