//! Hotfix server entry point.
//!
//! Boots the MCP server on stdio transport after resolving configuration,
//! opening the cache, and preloading the string table.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use hotfix_client::{FetchConfig, HotfixFetcher, Hotfixes, LocalStrings};
use hotfix_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(
        running_version = %config.running_version,
        base_url = %config.base_url,
        "Starting hotfix server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = HotfixFetcher::new(FetchConfig::from(&config))?;
    let hotfixes = Hotfixes::from_config(Arc::new(fetcher), db.clone(), &config);

    let strings = LocalStrings::new();
    let loaded = strings.preload(&hotfixes).await;
    tracing::info!(loaded, "string hotfixes ready");

    let state = Arc::new(handler::HotfixState { hotfixes, strings, db });
    let handler = handler::HotfixServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
