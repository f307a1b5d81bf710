//! cache_purge tool implementation.
//!
//! Deletes expired page cache entries. Live entries are never touched.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vitis_core::{Db, Error};

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(db: &Db) -> Result<CallToolResult, McpError> {
    let deleted = db.purge_expired_pages().await?;
    tracing::info!(deleted, "purged expired pages");

    let output = CachePurgeOutput { deleted };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::Serialization(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vitis_core::{CacheLookup, PageCache};

    #[tokio::test]
    async fn test_purge_impl_empty_cache() {
        let db = Db::open_in_memory().await.unwrap();
        let result = purge_impl(&db).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_purge_impl_keeps_live_entries() {
        let db = Db::open_in_memory().await.unwrap();
        db.set("exportacao:1:10", "{}", Duration::from_millis(10)).await.unwrap();
        db.set("exportacao:2:10", "{}", Duration::from_secs(3600)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let result = purge_impl(&db).await.unwrap();
        let value = serde_json::to_value(&result).unwrap();
        let output: CachePurgeOutput = serde_json::from_str(value["content"][0]["text"].as_str().unwrap()).unwrap();

        assert_eq!(output.deleted, 1);
        assert_eq!(db.get("exportacao:2:10").await.unwrap(), CacheLookup::Hit("{}".into()));
    }
}
