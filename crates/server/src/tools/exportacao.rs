//! exportacao tool implementation.
//!
//! Returns one page of the export dataset through the read-through cache.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vitis_core::{Error, ExportPages, PageRequest};

/// Input parameters for the exportacao tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportPageParams {
    /// Page number, starting at 1 (default: 1).
    #[serde(default = "default_page")]
    pub page: u64,

    /// Records per page, at least 1 (default: 10).
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    10
}

impl Default for ExportPageParams {
    fn default() -> Self {
        Self { page: default_page(), size: default_size() }
    }
}

/// Implementation of the exportacao tool.
pub async fn page_impl(pages: &ExportPages, params: ExportPageParams) -> Result<CallToolResult, McpError> {
    let request = PageRequest::new(params.page, params.size)?;

    let page = pages.get_page(request).await.inspect_err(|e| {
        tracing::error!(page = params.page, size = params.size, status = e.status_code(), error = %e, "page request failed");
    })?;

    let json = serde_json::to_string_pretty(&page).map_err(Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
