//! Worker configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFCACHE_*)
//! 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Worker configuration with layered loading.
///
/// The cache name, version and separator together fix the current generation
/// identifier; changing any of them is what a new deployment looks like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logical cache name.
    ///
    /// Set via OFFCACHE_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Cache version tag.
    ///
    /// Set via OFFCACHE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Separator placed between name and version.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Locators that must be cached before install succeeds.
    ///
    /// Set via OFFCACHE_PRIORITY environment variable (e.g. `[/,app.js]`).
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// Locators cached in the background after install starts.
    #[serde(default = "default_background")]
    pub background: Vec<String>,

    /// Page served to document requests that miss the cache.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Origin of the controlled page; relative locators resolve against it.
    ///
    /// Set via OFFCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite cache store.
    ///
    /// Set via OFFCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes accepted per fetched response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Host-imposed fetch timeout in milliseconds. Unset means a hung fetch
    /// hangs the caller.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_cache_name() -> String {
    "zero".into()
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_separator() -> String {
    "::".into()
}

fn default_priority() -> Vec<String> {
    ["/", "app.js", "app.css", "index.html", "offline.html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_background() -> Vec<String> {
    vec!["images/animated.gif".into()]
}

fn default_offline_path() -> String {
    "/offline.html".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offcache.sqlite")
}

fn default_user_agent() -> String {
    "offcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_name: default_cache_name(),
            cache_version: default_cache_version(),
            separator: default_separator(),
            priority: default_priority(),
            background: default_background(),
            offline_path: default_offline_path(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFCACHE_`
    /// 2. TOML file from `OFFCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
