//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    self, DEFAULT_COMPLETED_ROOM_TTL_SECS, DEFAULT_LANGUAGE, DEFAULT_LOG_FORMAT,
    DEFAULT_MAX_SOURCE_BYTES, DEFAULT_QUEUE_IDLE_TIMEOUT_SECS, DEFAULT_REDIS_KEY_PREFIX,
    DEFAULT_REDIS_URL, DEFAULT_RUN_MEMORY_LIMIT_MB, DEFAULT_RUN_TIME_LIMIT_MS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SIMULATED_PASS_RATE,
    DEFAULT_SWEEP_INTERVAL_SECS, runner_backends, store_backends,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub matchmaking: MatchmakingConfig,
    pub battle: BattleConfig,
    pub store: StoreConfig,
    pub runner: RunnerConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// `text` or `json`
    pub log_format: String,
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Matchmaking queue configuration
#[derive(Debug, Clone)]
pub struct MatchmakingConfig {
    pub queue_idle_timeout_secs: u64,
}

/// Battle lifecycle configuration
#[derive(Debug, Clone)]
pub struct BattleConfig {
    pub completed_room_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub default_language: String,
    /// Optional JSON file replacing the built-in challenge catalog
    pub catalog_path: Option<PathBuf>,
    pub max_source_bytes: usize,
}

/// Where queue and room state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
    pub key_prefix: String,
}

/// How submissions are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerBackend {
    Simulated,
    Docker,
}

/// Code runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub backend: RunnerBackend,
    pub simulated_pass_rate: f64,
    pub time_limit_ms: u64,
    pub memory_limit_mb: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            matchmaking: MatchmakingConfig::from_env()?,
            battle: BattleConfig::from_env()?,
            store: StoreConfig::from_env()?,
            runner: RunnerConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| DEFAULT_LOG_FORMAT.to_string());
        if log_format != "text" && log_format != "json" {
            return Err(ConfigError::InvalidValue("LOG_FORMAT".to_string()));
        }

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format,
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }

        Ok(Self { jwt_secret })
    }
}

impl MatchmakingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            queue_idle_timeout_secs: parse_var(
                "QUEUE_IDLE_TIMEOUT_SECS",
                DEFAULT_QUEUE_IDLE_TIMEOUT_SECS,
            )?,
        })
    }

    pub fn queue_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_idle_timeout_secs)
    }
}

impl BattleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let default_language =
            env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());
        if !constants::languages::ALL.contains(&default_language.as_str()) {
            return Err(ConfigError::InvalidValue("DEFAULT_LANGUAGE".to_string()));
        }

        let sweep_interval_secs = parse_var("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?;
        if sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("SWEEP_INTERVAL_SECS".to_string()));
        }

        Ok(Self {
            completed_room_ttl_secs: parse_var(
                "COMPLETED_ROOM_TTL_SECS",
                DEFAULT_COMPLETED_ROOM_TTL_SECS,
            )?,
            sweep_interval_secs,
            default_language,
            catalog_path: env::var("CATALOG_PATH").ok().map(PathBuf::from),
            max_source_bytes: parse_var("MAX_SOURCE_BYTES", DEFAULT_MAX_SOURCE_BYTES)?,
        })
    }

    pub fn completed_room_ttl(&self) -> Duration {
        Duration::from_secs(self.completed_room_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            store_backends::MEMORY => Ok(Self::Memory),
            store_backends::REDIS => Ok(Self::Redis),
            _ => Err(ConfigError::InvalidValue("STORE_BACKEND".to_string())),
        }
    }
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: StoreBackend::parse(
                &env::var("STORE_BACKEND").unwrap_or_else(|_| store_backends::MEMORY.to_string()),
            )?,
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            key_prefix: env::var("REDIS_KEY_PREFIX")
                .unwrap_or_else(|_| DEFAULT_REDIS_KEY_PREFIX.to_string()),
        })
    }
}

impl RunnerBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            runner_backends::SIMULATED => Ok(Self::Simulated),
            runner_backends::DOCKER => Ok(Self::Docker),
            _ => Err(ConfigError::InvalidValue("RUNNER_BACKEND".to_string())),
        }
    }
}

impl RunnerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let simulated_pass_rate: f64 =
            parse_var("SIMULATED_PASS_RATE", DEFAULT_SIMULATED_PASS_RATE)?;
        if !(0.0..=1.0).contains(&simulated_pass_rate) {
            return Err(ConfigError::InvalidValue("SIMULATED_PASS_RATE".to_string()));
        }

        let config = Self {
            backend: RunnerBackend::parse(
                &env::var("RUNNER_BACKEND")
                    .unwrap_or_else(|_| runner_backends::SIMULATED.to_string()),
            )?,
            simulated_pass_rate,
            time_limit_ms: parse_var("RUN_TIME_LIMIT_MS", DEFAULT_RUN_TIME_LIMIT_MS)?,
            memory_limit_mb: parse_var("RUN_MEMORY_LIMIT_MB", DEFAULT_RUN_MEMORY_LIMIT_MB)?,
        };

        if config.memory_limit_bytes().is_none() {
            return Err(ConfigError::InvalidValue("RUN_MEMORY_LIMIT_MB".to_string()));
        }

        Ok(config)
    }

    /// Container memory limit in bytes; `None` when zero or out of range
    pub fn memory_limit_bytes(&self) -> Option<i64> {
        if self.memory_limit_mb == 0 {
            return None;
        }
        self.memory_limit_mb
            .checked_mul(1024 * 1024)
            .and_then(|bytes| i64::try_from(bytes).ok())
    }
}

/// Read an optional variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }

    #[test]
    fn test_parse_var_falls_back_when_unset() {
        let value: u64 = parse_var("CODEDUEL_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!(StoreBackend::parse("memory").unwrap(), StoreBackend::Memory);
        assert_eq!(StoreBackend::parse("redis").unwrap(), StoreBackend::Redis);
        assert!(matches!(
            StoreBackend::parse("postgres"),
            Err(ConfigError::InvalidValue(name)) if name == "STORE_BACKEND"
        ));

        assert_eq!(RunnerBackend::parse("docker").unwrap(), RunnerBackend::Docker);
        assert!(RunnerBackend::parse("").is_err());
    }

    #[test]
    fn test_durations() {
        let battle = BattleConfig {
            completed_room_ttl_secs: 60,
            sweep_interval_secs: 5,
            default_language: DEFAULT_LANGUAGE.to_string(),
            catalog_path: None,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        };
        assert_eq!(battle.completed_room_ttl(), Duration::from_secs(60));
        assert_eq!(battle.sweep_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_memory_limit_bytes() {
        let mut runner = RunnerConfig {
            backend: RunnerBackend::Docker,
            simulated_pass_rate: 1.0,
            time_limit_ms: DEFAULT_RUN_TIME_LIMIT_MS,
            memory_limit_mb: 256,
        };
        assert_eq!(runner.memory_limit_bytes(), Some(256 * 1024 * 1024));

        runner.memory_limit_mb = 0;
        assert_eq!(runner.memory_limit_bytes(), None);

        // Fits in u64 but not in i64
        runner.memory_limit_mb = u64::MAX / (1024 * 1024);
        assert_eq!(runner.memory_limit_bytes(), None);

        runner.memory_limit_mb = u64::MAX;
        assert_eq!(runner.memory_limit_bytes(), None);
    }
}
