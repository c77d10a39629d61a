//! Server configuration.
//!
//! Sources are merged in order, later ones winning: built-in defaults, an
//! optional YAML file, then `OBJID_*` environment variables. Nested keys
//! use `__`, so `OBJID_CACHE__LOG_TTL_SECS=60` sets `cache.log_ttl_secs`.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//!   body_limit_bytes: 1048576
//! storage:
//!   backend: memory
//! cache:
//!   record_capacity: 100000
//!   log_capacity: 10000
//!   log_ttl_secs: 300
//!   max_log_entries: 1000
//! logging:
//!   level: info
//!   json: false
//! metrics:
//!   enabled: true
//!   path: /metrics
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use objid_domain::AppCacheConfig;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "OBJID";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Paths already served by the API router.
const RESERVED_PATHS: [&str; 2] = ["/health", "/ready"];
const API_PREFIX: &str = "/v2";

/// Top-level configuration of the `objid` binary.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
    pub metrics: MetricsSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body.
    pub body_limit_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            body_limit_bytes: 1 << 20,
        }
    }
}

impl ServerSettings {
    /// `host:port`, ready to be parsed as a socket address.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where app records and logs are kept.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

/// Sizing of the app cache and its log buffer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheSettings {
    pub record_capacity: u64,
    /// Apps whose logs may be buffered at once.
    pub log_capacity: u64,
    /// Buffered logs are re-read from storage after this long.
    pub log_ttl_secs: u64,
    /// Newest entries kept per app.
    pub max_log_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = AppCacheConfig::default();
        Self {
            record_capacity: defaults.record_capacity,
            log_capacity: defaults.log_capacity,
            log_ttl_secs: defaults.log_ttl.as_secs(),
            max_log_entries: defaults.max_log_entries,
        }
    }
}

impl CacheSettings {
    pub fn to_cache_config(&self) -> AppCacheConfig {
        AppCacheConfig::default()
            .with_record_capacity(self.record_capacity)
            .with_log_capacity(self.log_capacity)
            .with_log_ttl(Duration::from_secs(self.log_ttl_secs))
            .with_max_log_entries(self.max_log_entries)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level; `RUST_LOG` still takes precedence.
    pub level: String,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Prometheus endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub path: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ServerConfig {
    /// Reads `path` (YAML) on top of the defaults, then applies env overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Self::build(Some(path))
    }

    /// Defaults plus env overrides, no file.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::build(None)
    }

    fn build(file: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }
        let merged = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = merged.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges; every problem found is reported in one error.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let mut problems = Vec::new();

        if self.server.port == 0 {
            problems.push("server.port must be non-zero".to_string());
        }
        if self.server.body_limit_bytes == 0 {
            problems.push("server.body_limit_bytes must be non-zero".to_string());
        }
        if self.cache.record_capacity == 0 {
            problems.push("cache.record_capacity must be non-zero".to_string());
        }
        if self.cache.max_log_entries == 0 {
            problems.push("cache.max_log_entries must be non-zero".to_string());
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            problems.push(format!(
                "logging.level {:?} is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }
        if self.metrics.enabled {
            let path = self.metrics.path.as_str();
            if !path.starts_with('/') {
                problems.push(format!("metrics.path {path:?} must begin with '/'"));
            } else if is_reserved_path(path) {
                problems.push(format!("metrics.path {path:?} collides with an API route"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigLoadError::Invalid {
                message: problems.join("; "),
            })
        }
    }
}

fn is_reserved_path(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    RESERVED_PATHS.contains(&path)
        || path == API_PREFIX
        || path.starts_with(&format!("{API_PREFIX}/"))
}
