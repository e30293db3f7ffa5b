//! Install-time population of the current generation.

use std::sync::Arc;

use futures_util::future::try_join_all;
use offcache_client::{Fetch, resolve_locator};
use offcache_core::{CacheEntry, CacheStore, Error, Request};
use tokio::task::JoinHandle;
use url::Url;

use crate::Worker;

/// Result of a successful install.
#[derive(Debug)]
pub struct Installed {
    /// Bucket the priority set was written to.
    pub bucket: String,
    /// Number of priority entries stored.
    pub cached: usize,
    /// Background population; dropping the handle detaches it.
    pub background: JoinHandle<()>,
}

/// Fetch every locator and store the whole batch in `bucket`.
///
/// All-or-nothing: a rejected fetch, a non-2xx response, or a store error
/// aborts the batch before anything from it is written.
pub(crate) async fn add_all(
    store: &dyn CacheStore, network: &dyn Fetch, origin: &Url, bucket: &str, locators: &[String],
) -> Result<usize, Error> {
    let urls = locators
        .iter()
        .map(|locator| resolve_locator(origin, locator).map_err(|e| Error::InvalidUrl(format!("{locator}: {e}"))))
        .collect::<Result<Vec<_>, _>>()?;

    let fetches = urls.iter().map(|url| async move {
        let response = network.fetch(&Request::get(url.as_str())).await?;
        if !response.is_ok() {
            return Err(Error::HttpError(format!("{url}: status {}", response.status)));
        }
        Ok(CacheEntry::new(url.as_str(), response))
    });

    let entries = try_join_all(fetches).await?;
    let count = entries.len();
    store.put_all(bucket, entries).await?;

    Ok(count)
}

impl Worker {
    /// Populate the current generation's bucket from the manifest.
    ///
    /// The background set is handed to a detached task whose failure is only
    /// logged. The priority set is awaited; any failure fails the install.
    /// No retries.
    pub async fn populate(&self) -> Result<Installed, Error> {
        let bucket = self.generation.id().to_string();
        self.store.open(&bucket).await?;

        let background = {
            let store = Arc::clone(&self.store);
            let network = Arc::clone(&self.network);
            let origin = self.origin.clone();
            let bucket = bucket.clone();
            let locators = self.manifest.background.clone();

            tokio::spawn(async move {
                match add_all(store.as_ref(), network.as_ref(), &origin, &bucket, &locators).await {
                    Ok(count) => tracing::debug!(%bucket, count, "background resources cached"),
                    Err(e) => tracing::warn!(%bucket, error = %e, "background population failed"),
                }
            })
        };

        let cached =
            add_all(self.store.as_ref(), self.network.as_ref(), &self.origin, &bucket, &self.manifest.priority).await?;

        tracing::info!(%bucket, cached, "priority resources cached");

        Ok(Installed { bucket, cached, background })
    }
}
