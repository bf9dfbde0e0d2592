use serde::Deserialize;

use crate::utils::constants::{DEFAULT_DEVICE_ID, DEFAULT_INTERVAL_SECS};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    /// pid file written at startup and removed on shutdown; empty disables it
    pub pid_filename: Option<String>,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
}

/// ================================
/// Collection schedule
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CollectConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// run a single cycle and exit instead of collecting on a timer
    #[serde(default)]
    pub disabled: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self { interval_seconds: default_interval_seconds(), disabled: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_id")]
    pub id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { id: default_device_id() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_interval_seconds() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> String {
    "9100".to_string()
}
