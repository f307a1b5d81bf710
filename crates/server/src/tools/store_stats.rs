//! store_stats tool implementation.
//!
//! Reports how many distinct records the store holds.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vitis_core::{Db, Error};

/// Output from the store_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreStatsOutput {
    /// Distinct records persisted so far, across all fetches.
    pub records: u64,
}

pub async fn stats_impl(db: &Db) -> Result<CallToolResult, McpError> {
    let records = db.count_records().await?;
    let json = serde_json::to_string_pretty(&StoreStatsOutput { records }).map_err(Error::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
