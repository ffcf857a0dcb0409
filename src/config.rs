//! Application configuration
//!
//! Loaded from a TOML file. The path comes from `STOREFRONT_CONFIG`, falling
//! back to `~/.config/storefront/config.toml`. Every field has a default,
//! so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::seo::indexnow::DEFAULT_ENDPOINT;
use crate::domain::listing::DEFAULT_PAGE_SIZE;
use crate::infrastructure::DatabaseConfig;
use crate::shared::errors::InfraError;

pub const CONFIG_ENV: &str = "STOREFRONT_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub seo: SeoConfig,
    pub indexnow: IndexNowConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
        }
    }
}

impl DatabaseSettings {
    pub fn connection_url(&self) -> String {
        self.url.clone()
    }
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(s: &DatabaseSettings) -> Self {
        Self {
            url: s.connection_url(),
            max_connections: s.max_connections,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Listing cache lifetime; 0 disables the cache
    pub cache_ttl_secs: u64,
    /// Upper bound on cached listing pages
    pub cache_max_entries: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
            cache_ttl_secs: 3600,
            cache_max_entries: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    /// Public origin used in robots.txt and sitemaps
    pub base_url: String,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexNowConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// Site host submitted to IndexNow, e.g. `shop.example.com`
    pub host: String,
    pub key: String,
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            host: String::new(),
            key: String::new(),
        }
    }
}

impl AppConfig {
    /// `$STOREFRONT_CONFIG`, else the per-user config directory.
    pub fn default_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storefront")
            .join("config.toml")
    }

    /// Load from `path`, or from [`default_config_path`](Self::default_config_path).
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, InfraError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&raw)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), InfraError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }

    /// Problems that would stop the service from starting sensibly.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.catalog.default_page_size == 0 {
            problems.push("catalog.default_page_size must be positive".to_string());
        }
        if self.catalog.max_page_size < self.catalog.default_page_size {
            problems.push("catalog.max_page_size is below catalog.default_page_size".to_string());
        }
        if self.catalog.cache_ttl_secs > 0 && self.catalog.cache_max_entries == 0 {
            problems.push("catalog.cache_max_entries must be positive".to_string());
        }
        if self.database.url.trim().is_empty() {
            problems.push("database.url is empty".to_string());
        }
        if self.indexnow.enabled && (self.indexnow.host.is_empty() || self.indexnow.key.is_empty())
        {
            problems.push("indexnow is enabled but host or key is missing".to_string());
        }
        problems
    }
}
