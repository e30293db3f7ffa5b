//! Resource manifest: what gets cached at install time.

use std::collections::HashSet;

use crate::config::AppConfig;

/// The two ordered locator sets that populate a generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceManifest {
    /// Must be cached before install succeeds.
    pub priority: Vec<String>,
    /// Cached opportunistically; install does not wait on these.
    pub background: Vec<String>,
}

impl ResourceManifest {
    pub fn new(priority: Vec<String>, background: Vec<String>) -> Self {
        Self { priority, background }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.priority.clone(), config.background.clone())
    }

    /// Locators listed more than once across both sets, in first-repeat order.
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        for locator in self.priority.iter().chain(self.background.iter()) {
            if !seen.insert(locator.as_str()) && !dups.contains(&locator.as_str()) {
                dups.push(locator.as_str());
            }
        }
        dups
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.priority.iter().chain(self.background.iter()).any(|l| l == locator)
    }
}
