//! Engine configuration.
//!
//! This module provides YAML/JSON configuration file support for the
//! engine's timing knobs.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! engine:
//!   tick_interval_ms: 10
//!   flush_interval_ms: 25
//!   fast_burst_ms: 10
//!   log_level: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Timing parameters of the engine's drivers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineParams {
    /// Normal-mode tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Update flush interval in milliseconds.
    #[serde(default = "default_flush_interval")]
    pub flush_interval_ms: u64,

    /// Fast-mode wall-clock budget per burst, in milliseconds.
    #[serde(default = "default_fast_burst")]
    pub fast_burst_ms: u64,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_tick_interval() -> u64 {
    10
}

fn default_flush_interval() -> u64 {
    25
}

fn default_fast_burst() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            flush_interval_ms: default_flush_interval(),
            fast_burst_ms: default_fast_burst(),
            log_level: default_log_level(),
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Timing parameters.
    #[serde(default)]
    pub engine: EngineParams,
}

impl EngineConfig {
    /// Creates a configuration with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.engine.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.engine.flush_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "flush_interval_ms must be positive".to_string(),
            ));
        }
        if self.engine.fast_burst_ms == 0 {
            tracing::warn!("fast_burst_ms is 0; fast mode will drain one event per burst");
        }
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating an [`EngineConfig`] programmatically.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normal-mode tick interval.
    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.config.engine.tick_interval_ms = ms;
        self
    }

    /// Sets the update flush interval.
    pub fn flush_interval_ms(mut self, ms: u64) -> Self {
        self.config.engine.flush_interval_ms = ms;
        self
    }

    /// Sets the fast-mode burst budget.
    pub fn fast_burst_ms(mut self, ms: u64) -> Self {
        self.config.engine.fast_burst_ms = ms;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.engine.log_level = level.into();
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::new();
        assert_eq!(config.engine.tick_interval_ms, 10);
        assert_eq!(config.engine.flush_interval_ms, 25);
        assert_eq!(config.engine.fast_burst_ms, 10);
    }

    #[test]
    fn yaml_parsing() {
        let yaml = r#"
engine:
  tick_interval_ms: 5
  flush_interval_ms: 50
  log_level: debug
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.engine.tick_interval_ms, 5);
        assert_eq!(config.engine.flush_interval_ms, 50);
        // Unspecified fields take defaults
        assert_eq!(config.engine.fast_burst_ms, 10);
        assert_eq!(config.engine.log_level, "debug");
    }

    #[test]
    fn json_parsing() {
        let json = r#"{ "engine": { "tick_interval_ms": 20 } }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.engine.tick_interval_ms, 20);
    }

    #[test]
    fn builder() {
        let config = EngineConfigBuilder::new()
            .tick_interval_ms(2)
            .flush_interval_ms(100)
            .build()
            .unwrap();
        assert_eq!(config.engine.tick_interval_ms, 2);
        assert_eq!(config.engine.flush_interval_ms, 100);
    }

    #[test]
    fn validation_rejects_zero_interval() {
        let result = EngineConfigBuilder::new().tick_interval_ms(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn serialization_roundtrip() {
        let config = EngineConfigBuilder::new().tick_interval_ms(7).build().unwrap();
        let yaml = config.to_yaml().unwrap();
        let restored = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.engine.tick_interval_ms, restored.engine.tick_interval_ms);
    }
}
