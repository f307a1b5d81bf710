//! vitis server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use vitis_client::{HttpSource, TradeTableExtractor};
use vitis_core::{AppConfig, Db, ExportPages, IngestEngine, PipelineSettings};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    tracing::info!(
        source = %config.source_url,
        db_path = %config.db_path.display(),
        cache_ttl_secs = config.cache_ttl_secs,
        "Starting vitis server on stdio transport"
    );

    let db = Db::open(&config.db_path).await.context("opening database")?;
    let source = HttpSource::from_config(&config).context("building HTTP source")?;
    let extractor = TradeTableExtractor::new().context("building table extractor")?;

    let pages = ExportPages::new(
        Arc::new(source),
        Arc::new(extractor),
        IngestEngine::new(Arc::new(db.clone()), config.store_timeout()),
        Arc::new(db.clone()),
        PipelineSettings::from(&config),
    );

    let handler = handler::VitisServer::new(Arc::new(pages), db);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    tracing::info!("vitis server stopped");

    Ok(())
}
