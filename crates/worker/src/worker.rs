//! Worker instance state.

use std::sync::Arc;

use offcache_client::{Fetch, resolve_locator};
use offcache_core::{AppConfig, CacheStore, Error, Generation, ResourceManifest};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// One worker instance: a fixed generation and manifest bound to a shared
/// cache store and a network collaborator.
///
/// Several instances may share one store; each handles its own events one at
/// a time.
pub struct Worker {
    pub(crate) generation: Generation,
    pub(crate) manifest: ResourceManifest,
    pub(crate) origin: Url,
    pub(crate) offline_url: String,
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) network: Arc<dyn Fetch>,
    /// Background population tasks spawned by installs and not yet awaited.
    pub(crate) pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Worker {
    /// Build a worker from configuration.
    ///
    /// The generation identifier is computed here and never changes for the
    /// life of this instance.
    pub fn new(config: &AppConfig, store: Arc<dyn CacheStore>, network: Arc<dyn Fetch>) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let offline_url = resolve_locator(&origin, &config.offline_path)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.offline_path)))?;

        let generation = Generation::from_config(config);
        tracing::info!(generation = %generation, offline_url = %offline_url, "worker instance created");

        Ok(Self {
            generation,
            manifest: ResourceManifest::from_config(config),
            origin,
            offline_url: offline_url.to_string(),
            store,
            network,
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Track a background population task, dropping handles that already finished.
    pub(crate) async fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self.pending.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait for every background population task spawned so far.
    pub async fn settle(&self) {
        let handles = std::mem::take(&mut *self.pending.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "background population task aborted");
            }
        }
    }
}
