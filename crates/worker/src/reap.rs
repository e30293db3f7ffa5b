//! Activation-time removal of superseded generations.

use futures_util::future::join_all;
use offcache_core::Error;
use serde::Serialize;

use crate::Worker;

/// What a reap pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapReport {
    /// Stale buckets removed by this pass.
    pub deleted: Vec<String>,
    /// Stale buckets whose deletion failed; they remain in the store.
    pub failed: Vec<String>,
}

impl Worker {
    /// Delete every bucket that is not the current generation.
    ///
    /// Deletions run concurrently and independently: one failure is logged
    /// and recorded, the rest still run. Only failing to list the buckets
    /// is an error.
    pub async fn reap(&self) -> Result<ReapReport, Error> {
        let stale = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|key| !self.generation.is_current(key))
            .collect::<Vec<_>>();

        let results = join_all(stale.into_iter().map(|key| async move {
            let result = self.store.delete(&key).await;
            (key, result)
        }))
        .await;

        let mut report = ReapReport::default();
        for (key, result) in results {
            match result {
                Ok(true) => report.deleted.push(key),
                Ok(false) => tracing::debug!(bucket = %key, "stale bucket already gone"),
                Err(e) => {
                    tracing::warn!(bucket = %key, error = %e, "failed to delete stale bucket");
                    report.failed.push(key);
                }
            }
        }

        tracing::info!(
            current = %self.generation,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "stale generations reaped"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::testing::{BrokenStore, FakeNetwork, StickyStore, ok, site_config, url, worker};
    use offcache_core::{CacheDb, CacheEntry, CacheStore};

    #[tokio::test]
    async fn test_reap_removes_stale_generation() {
        let (worker, db) = worker(Arc::new(FakeNetwork::site())).await;
        db.put_all("zero::v0.9.0", vec![CacheEntry::new(url("/"), ok("text/html", "old"))])
            .await
            .unwrap();
        db.open("zero::v1.0.0").await.unwrap();

        let report = worker.reap().await.unwrap();

        assert_eq!(report.deleted, vec!["zero::v0.9.0"]);
        assert!(report.failed.is_empty());
        assert_eq!(db.keys().await.unwrap(), vec!["zero::v1.0.0"]);
    }

    #[tokio::test]
    async fn test_install_then_reap_leaves_only_current() {
        let (worker, db) = worker(Arc::new(FakeNetwork::site())).await;
        for stale in ["zero::v0.8.0", "zero::v0.9.0", "other::v1.0.0"] {
            db.open(stale).await.unwrap();
        }

        worker.populate().await.unwrap().background.await.unwrap();
        worker.reap().await.unwrap();

        assert_eq!(db.keys().await.unwrap(), vec!["zero::v1.0.0"]);
        assert_eq!(db.match_url(&url("/")).await.unwrap().unwrap().text(), "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_reap_with_nothing_stale() {
        let (worker, db) = worker(Arc::new(FakeNetwork::site())).await;
        db.open("zero::v1.0.0").await.unwrap();

        let report = worker.reap().await.unwrap();
        assert_eq!(report, ReapReport::default());
        assert_eq!(db.keys().await.unwrap(), vec!["zero::v1.0.0"]);
    }

    #[tokio::test]
    async fn test_reap_isolates_deletion_failures() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for bucket in ["zero::v0.8.0", "zero::v0.9.0", "zero::v1.0.0"] {
            db.open(bucket).await.unwrap();
        }
        let store = StickyStore { inner: db.clone(), sticky: HashSet::from(["zero::v0.8.0".to_string()]) };
        let worker = Worker::new(&site_config(), Arc::new(store), Arc::new(FakeNetwork::site())).unwrap();

        let report = worker.reap().await.unwrap();

        assert_eq!(report.deleted, vec!["zero::v0.9.0"]);
        assert_eq!(report.failed, vec!["zero::v0.8.0"]);
        assert_eq!(db.keys().await.unwrap(), vec!["zero::v0.8.0", "zero::v1.0.0"]);
    }

    #[tokio::test]
    async fn test_reap_fails_when_keys_unavailable() {
        let worker = Worker::new(&site_config(), Arc::new(BrokenStore), Arc::new(FakeNetwork::site())).unwrap();
        assert!(worker.reap().await.is_err());
    }
}
