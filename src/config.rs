//! Service configuration.
//!
//! Loaded from an optional `config.toml` with environment overrides. Flat
//! keys map to plain variables (`USE_REAL_MODEL`, `MODEL_BACKEND_URL`,
//! `BACKEND_TIMEOUT_MS`); nested keys join with `__` (`SERVER__PORT`).

use std::time::Duration;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Dispatch real inference to the sidecar instead of always stubbing.
    #[serde(default)]
    pub use_real_model: bool,
    #[serde(default = "default_model_backend_url")]
    pub model_backend_url: String,
    /// Deadline for one real inference call.
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,
    /// Ring-buffer capacity per session, about 20s of samples at 100Hz.
    #[serde(default = "default_max_samples")]
    pub default_max_samples: usize,
    /// Minimum spacing between recovery probes after a failure.
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
    #[serde(default = "default_sweep_max_age_secs")]
    pub sweep_max_age_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn sweep_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.sweep_max_age_secs as i64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            use_real_model: false,
            model_backend_url: default_model_backend_url(),
            backend_timeout_ms: default_backend_timeout_ms(),
            default_max_samples: default_max_samples(),
            health_check_interval_secs: default_health_check_interval_secs(),
            sweep_max_age_secs: default_sweep_max_age_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model_backend_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_backend_timeout_ms() -> u64 {
    1500
}

fn default_max_samples() -> usize {
    2000
}

fn default_health_check_interval_secs() -> u64 {
    30
}

fn default_sweep_max_age_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}
