//! Cache generation identity.

use std::fmt;

use crate::config::AppConfig;

/// The current cache generation, e.g. `zero::v1.0.0`.
///
/// Computed once when a worker starts and never mutated afterwards. A new
/// deployment changes the name or version and therefore the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generation {
    id: String,
}

impl Generation {
    pub fn new(name: &str, version: &str, separator: &str) -> Self {
        Self { id: format!("{name}{separator}{version}") }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.cache_name, &config.cache_version, &config.separator)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether `bucket` names this generation.
    pub fn is_current(&self, bucket: &str) -> bool {
        self.id == bucket
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
