//! offcache worker entry point.
//!
//! Boots one worker instance and bridges lifecycle events from the host over
//! stdio. Logging goes to stderr to avoid interfering with the event stream
//! on stdout.

use std::sync::Arc;

use anyhow::Result;
use offcache_client::{FetchClient, FetchConfig};
use offcache_core::{AppConfig, CacheDb};
use offcache_worker::{Worker, host};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), origin = %config.origin, "starting offcache worker on stdio");

    let store = CacheDb::open(&config.db_path).await?;
    let network = FetchClient::new(FetchConfig::from(&config))?;
    let worker = Worker::new(&config, Arc::new(store), Arc::new(network))?;

    host::serve(&worker, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    Ok(())
}
