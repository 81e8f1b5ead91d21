//! notekeep server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notekeep_core::{AppConfig, IdentityGate, NoteQueryService, SqliteCache, SqliteNoteStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

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
    let secret = config.require_jwt_secret()?;
    tracing::info!(?config, "loaded configuration");

    let store = SqliteNoteStore::open(&config.db_path).await?;
    let cache = SqliteCache::open(&config.cache_path).await?;

    let service = NoteQueryService::new(Arc::new(store), Arc::new(cache.clone())).with_cache_ttl(config.cache_ttl_secs);
    let gate = IdentityGate::new(secret.as_bytes(), i64::try_from(config.token_ttl_secs)?)
        .with_leeway(i64::try_from(config.token_leeway_secs)?);

    let purger = tokio::spawn(purge_expired_loop(cache.clone(), Duration::from_secs(config.cache_ttl_secs)));

    tracing::info!("Starting notekeep server on stdio transport");

    let handler = handler::NotekeepServer::new(service, gate);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    purger.abort();
    if let Err(e) = cache.close().await {
        tracing::warn!(error = %e, "failed to close cache");
    }

    Ok(())
}

/// Periodically drop expired cache rows so the cache file stays bounded.
async fn purge_expired_loop(cache: SqliteCache, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await;
    loop {
        interval.tick().await;
        match cache.purge_expired().await {
            Ok(0) => {}
            Ok(deleted) => tracing::debug!(deleted, "purged expired cache entries"),
            Err(e) => tracing::warn!(error = %e, "cache purge failed"),
        }
    }
}
