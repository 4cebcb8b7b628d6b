//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file, then applies
//! overrides from the command line and environment. `AppConfig` is the root
//! configuration struct containing all settings.

use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Application Identity
// =============================================================================

/// Application name reported by the configuration route
pub const APP_NAME: &str = "cloud-native-demo";

/// Application version reported by the configuration route
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Probe and counter responses must never be served from an intermediate cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Key-Value Store
// =============================================================================

/// Hash key holding the per-host counters
pub const HOSTS_KEY: &str = "hosts";

// =============================================================================
// Default Values
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "cloud_native_demo=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 5000;

/// Seconds to wait for in-flight requests after SIGTERM/SIGINT
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

pub const DEFAULT_REDIS_HOST: &str = "localhost";
pub const DEFAULT_REDIS_PORT: u16 = 6379;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Redis connection settings
    #[serde(default)]
    pub redis: RedisConfig,
    /// Which key-value store backs the counter
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Graceful shutdown window in seconds
    #[serde(default = "HttpServerConfig::default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }

    fn default_shutdown_grace() -> u64 {
        DEFAULT_SHUTDOWN_GRACE_SECS
    }
}

/// Redis connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "RedisConfig::default_host")]
    pub host: String,
    #[serde(default = "RedisConfig::default_port")]
    pub port: u16,
    /// Logical database index
    #[serde(default)]
    pub db: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            db: 0,
        }
    }
}

impl RedisConfig {
    fn default_host() -> String {
        DEFAULT_REDIS_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_REDIS_PORT
    }

    /// Connection URL in the form understood by `redis::Client::open`
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Key-value store backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// External Redis server (default)
    #[default]
    Redis,
    /// In-process map, for running without Redis
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CounterConfig {
    /// Use a single atomic increment instead of the exists-then-set pair.
    /// Off by default, which leaves concurrent increments racy.
    #[serde(default)]
    pub atomic_increment: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

/// Values supplied on the command line or through the environment.
/// Any field that is set replaces the corresponding file setting.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub redis_host: Option<String>,
    pub redis_port: Option<u16>,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load the file at `path`, or fall back to built-in defaults when the
    /// path is the default one and nothing exists there.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.http.host = host;
        }
        if let Some(port) = overrides.port {
            self.http.port = port;
        }
        if let Some(host) = overrides.redis_host {
            self.redis.host = host;
        }
        if let Some(port) = overrides.redis_port {
            self.redis.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Validation("http.host must not be empty".to_string()));
        }
        if self.http.port == 0 {
            return Err(ConfigError::Validation("http.port must not be 0".to_string()));
        }
        if self.store.backend == StoreBackend::Redis {
            if self.redis.host.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "redis.host must not be empty".to_string(),
                ));
            }
            if self.redis.port == 0 {
                return Err(ConfigError::Validation("redis.port must not be 0".to_string()));
            }
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.redis.host, DEFAULT_REDIS_HOST);
        assert_eq!(config.redis.port, DEFAULT_REDIS_PORT);
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert!(!config.counter.atomic_increment);
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::parse(
            r#"
            [http]
            host = "127.0.0.1"
            port = 8080
            shutdown_grace_seconds = 5

            [redis]
            host = "redis.default.svc"
            port = 6380
            db = 2

            [store]
            backend = "memory"

            [counter]
            atomic_increment = true

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.shutdown_grace_seconds, 5);
        assert_eq!(config.redis.url(), "redis://redis.default.svc:6380/2");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.counter.atomic_increment);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let err = AppConfig::parse("[store]\nbackend = \"etcd\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = AppConfig::parse("[http]\nport = 8080\n").unwrap();
        config.apply_overrides(ConfigOverrides {
            host: None,
            port: Some(9090),
            redis_host: Some("cache".to_string()),
            redis_port: None,
        });
        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.redis.host, "cache");
        assert_eq!(config.redis.port, DEFAULT_REDIS_PORT);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.http.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = AppConfig::default();
        config.redis.host = String::new();
        assert!(config.validate().is_err());

        // Redis settings are irrelevant with the in-memory backend
        config.store.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[redis]\nhost = \"10.0.0.5\"").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.redis.host, "10.0.0.5");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = AppConfig::load_or_default("/nonexistent/demo.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
