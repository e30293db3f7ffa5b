//! Lifecycle events consumed from the host and their outcomes.

use offcache_core::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::Worker;

/// One event delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    Install,
    Activate,
    Fetch { request: Request },
    /// List the buckets currently in the store.
    Keys,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Install => "install",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Fetch { .. } => "fetch",
            LifecycleEvent::Keys => "keys",
        }
    }
}

/// What the worker hands back through the event's deferral handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventOutcome {
    Installed { bucket: String, cached: usize },
    Activated { current: String, deleted: Vec<String>, failed: Vec<String> },
    Responded { response: Response },
    Keys { keys: Vec<String> },
    /// The event's promise rejected. For `install` this means the worker
    /// must not activate.
    Failed { event: String, error: String },
}

impl EventOutcome {
    fn failed(event: &str, error: impl ToString) -> Self {
        EventOutcome::Failed { event: event.to_string(), error: error.to_string() }
    }
}

impl Worker {
    /// Route one lifecycle event to its handler.
    ///
    /// Background population started by `install` is tracked and can be
    /// awaited with [`Worker::settle`].
    pub async fn handle(&self, event: LifecycleEvent) -> EventOutcome {
        let name = event.name();
        match event {
            LifecycleEvent::Install => match self.populate().await {
                Ok(installed) => {
                    self.track(installed.background).await;
                    EventOutcome::Installed { bucket: installed.bucket, cached: installed.cached }
                }
                Err(e) => {
                    tracing::error!(generation = %self.generation, error = %e, "install failed");
                    EventOutcome::failed(name, e)
                }
            },
            LifecycleEvent::Activate => match self.reap().await {
                Ok(report) => EventOutcome::Activated {
                    current: self.generation.id().to_string(),
                    deleted: report.deleted,
                    failed: report.failed,
                },
                Err(e) => {
                    tracing::error!(generation = %self.generation, error = %e, "activate failed");
                    EventOutcome::failed(name, e)
                }
            },
            LifecycleEvent::Fetch { request } => EventOutcome::Responded { response: self.resolve(&request).await },
            LifecycleEvent::Keys => match self.store.keys().await {
                Ok(keys) => EventOutcome::Keys { keys },
                Err(e) => EventOutcome::failed(name, e),
            },
        }
    }
}
