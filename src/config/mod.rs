//! Configuration management for Hubwatch
//!
//! Loading, validation, and defaults for the configuration file. The device
//! address, log path, poll interval, clustering gap, and recommendation
//! thresholds are all plain configuration values; nothing is hard-coded in
//! the pipeline or the analysis engine.

use crate::error::{HubwatchError, Result};
use crate::patterns::PatternsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta", default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            schema_version: "1.0.0".to_string(),
        }
    }
}

/// Gateway device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// IP address or hostname of the gateway
    pub address: String,
    /// Seconds between polling cycles
    pub poll_interval_secs: u64,
    /// Per-request timeout toward the device
    pub request_timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: "192.168.0.1".to_string(),
            poll_interval_secs: 10,
            request_timeout_secs: 10,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the append-only event log
    pub log_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("~/.hubwatch/events.log"),
        }
    }
}

/// Analysis settings
///
/// The defaults are operational observations, not derived constants; they
/// carry no semantics beyond the thresholds themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum gap in seconds between critical events in one outage cluster
    pub outage_gap_secs: u64,
    /// Critical share of the log (percent) above which the signal-trouble
    /// recommendation fires
    pub critical_percent_threshold: f64,
    /// Outage-window count above which the connection-check recommendation fires
    pub outage_count_threshold: usize,
    /// MDD timeout count above which the downstream-issue recommendation fires
    pub mdd_timeout_threshold: usize,
    /// DBC mismatch count above which the signal-quality recommendation fires
    pub dbc_mismatch_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outage_gap_secs: 300,
            critical_percent_threshold: 5.0,
            outage_count_threshold: 3,
            mdd_timeout_threshold: 20,
            dbc_mismatch_threshold: 10,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HubwatchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HubwatchError::Io {
            source: e,
            context: format!("Failed to read config file: {}", path.display()),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| HubwatchError::Io {
            source: e,
            context: format!("Failed to write config file: {}", path.display()),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: HUBWATCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("HUBWATCH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "DEVICE__ADDRESS" => {
                self.device.address = value.to_string();
            }
            "DEVICE__POLL_INTERVAL_SECS" => {
                self.device.poll_interval_secs = parse_env(path, value)?;
            }
            "STORAGE__LOG_FILE" => {
                self.storage.log_file = PathBuf::from(value);
            }
            "ANALYSIS__OUTAGE_GAP_SECS" => {
                self.analysis.outage_gap_secs = parse_env(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HubwatchError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("hubwatch").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig::default(),
            device: DeviceConfig::default(),
            storage: StorageConfig::default(),
            analysis: AnalysisConfig::default(),
            patterns: PatternsConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| HubwatchError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}'", value),
        })
}
