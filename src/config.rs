use std::collections::HashSet;
use std::path::PathBuf;

use tracing::trace;

use crate::error::ConfigError;

/// Storage backend configuration
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Keep recent results in memory only
    #[default]
    Memory,

    /// SQLite database file holding the check history
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./monitor.db")
}

/// Where DOWN alerts are delivered
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertConfig {
    /// Write alerts to the log
    #[default]
    Log,

    /// POST alerts as JSON to a webhook
    Webhook(Webhook),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

/// Tunables of the check engine and its anomaly baseline
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EngineConfig {
    /// Maximum number of probes in flight
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Latency samples kept per service
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Samples needed before latencies are judged
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Lower bound applied to the standard deviation (seconds)
    #[serde(default = "default_min_deviation")]
    pub min_deviation: f64,

    /// SLA threshold used when a service does not set its own (seconds)
    #[serde(default = "default_sla_threshold")]
    pub default_sla_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            history_size: default_history_size(),
            min_samples: default_min_samples(),
            min_deviation: default_min_deviation(),
            default_sla_threshold: default_sla_threshold(),
        }
    }
}

fn default_workers() -> usize {
    10
}

fn default_history_size() -> usize {
    20
}

fn default_min_samples() -> usize {
    5
}

fn default_min_deviation() -> f64 {
    0.05
}

fn default_sla_threshold() -> f64 {
    1.0
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    pub services: Vec<ServiceConfig>,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub alert: AlertConfig,
}

/// A single service to probe.
///
/// `service_type` is kept as written in the file; it is resolved to a
/// [`crate::ServiceType`] when the engine dispatches the check, so unknown
/// types can be skipped without rejecting the whole configuration.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ServiceConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub service_type: String,

    pub url: Option<String>,
    pub wsdl: Option<String>,
    pub queue_name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,

    /// Request timeout in seconds (fractions allowed), protocol specific default when unset
    pub timeout: Option<f64>,

    #[serde(default = "default_expected_status")]
    pub expected_status: u16,

    /// Response time above which a healthy service is degraded (seconds)
    pub sla_threshold: Option<f64>,

    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    #[serde(default)]
    pub simulation_mode: bool,

    #[serde(default = "default_max_queue_depth")]
    pub max_queue_depth: u64,
}

impl ServiceConfig {
    /// Minimal configuration for a service; every optional field takes its default.
    pub fn new(name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_type: service_type.into(),
            url: None,
            wsdl: None,
            queue_name: None,
            host: None,
            port: None,
            timeout: None,
            expected_status: default_expected_status(),
            sla_threshold: None,
            verify_ssl: default_verify_ssl(),
            simulation_mode: false,
            max_queue_depth: default_max_queue_depth(),
        }
    }
}

fn default_expected_status() -> u16 {
    200
}

fn default_verify_ssl() -> bool {
    true
}

fn default_max_queue_depth() -> u64 {
    1000
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();

        for (idx, service) in self.services.iter().enumerate() {
            if service.name.trim().is_empty() || service.service_type.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "service at index {idx} is malformed, 'name' and 'type' are required"
                )));
            }

            if let Some(timeout) = service.timeout.filter(|t| !(t.is_finite() && *t > 0.0)) {
                return Err(ConfigError::Invalid(format!(
                    "service '{}' has an invalid timeout ({timeout}), expected seconds > 0",
                    service.name
                )));
            }

            if !names.insert(service.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate service name '{}'",
                    service.name
                )));
            }
        }

        let engine = &self.engine;
        if engine.workers == 0 {
            return Err(ConfigError::Invalid("engine.workers must be at least 1".into()));
        }
        if engine.min_samples < 2 || engine.history_size < engine.min_samples {
            return Err(ConfigError::Invalid(format!(
                "engine.history_size ({}) must be >= engine.min_samples ({}) >= 2",
                engine.history_size, engine.min_samples
            )));
        }
        if engine.min_deviation < 0.0 {
            return Err(ConfigError::Invalid(
                "engine.min_deviation must not be negative".into(),
            ));
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn read_config_file(path: &str) -> Result<MonitorConfig, ConfigError> {
    let file_content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_config(&file_content).inspect(|config| trace!("loaded config: {config:?}"))
}
