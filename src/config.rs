//! Engine Configuration
//!
//! Features:
//! - Sensible defaults
//! - JSON config files
//! - Environment variable overrides (`SAFEALLOC_*`)
//! - Configuration validation

use crate::deadlock::WaitEdgePolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which blocking resources contribute wait-for edges
    pub wait_edges: WaitEdgePolicy,

    /// Emit a trace event for every completion step of the safety check
    pub trace_steps: bool,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (full, compact)
    pub format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wait_edges: WaitEdgePolicy::FirstBlockingResource,
            trace_steps: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "full".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: EngineConfig = serde_json::from_str(&raw)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(policy) = std::env::var("SAFEALLOC_WAIT_EDGES") {
            self.wait_edges = policy.parse()?;
        }
        if let Ok(trace) = std::env::var("SAFEALLOC_TRACE_STEPS") {
            self.trace_steps = trace
                .parse()
                .map_err(|_| Error::ConfigError("Invalid SAFEALLOC_TRACE_STEPS".to_string()))?;
        }
        if let Ok(level) = std::env::var("SAFEALLOC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SAFEALLOC_LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(Error::ConfigError(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["full", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(Error::ConfigError(format!(
                "Invalid log format: {}. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            )));
        }

        Ok(())
    }
}

/// Configuration builder for programmatic setup
pub struct ConfigBuilder {
    config: EngineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_wait_edges(mut self, policy: WaitEdgePolicy) -> Self {
        self.config.wait_edges = policy;
        self
    }

    pub fn with_trace_steps(mut self, enabled: bool) -> Self {
        self.config.trace_steps = enabled;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.wait_edges, WaitEdgePolicy::FirstBlockingResource);
        assert!(!config.trace_steps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_wait_edges(WaitEdgePolicy::AllBlockingResources)
            .with_trace_steps(true)
            .with_log_level("debug")
            .with_log_format("compact")
            .build()
            .unwrap();

        assert_eq!(config.wait_edges, WaitEdgePolicy::AllBlockingResources);
        assert!(config.trace_steps);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(ConfigBuilder::new().with_log_level("loud").build().is_err());
        assert!(ConfigBuilder::new().with_log_format("xml").build().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"wait_edges": "all-blocking-resources"}}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wait_edges, WaitEdgePolicy::AllBlockingResources);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_from_file_missing() {
        let result = EngineConfig::from_file("/nonexistent/safealloc.json");
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_from_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let result = EngineConfig::from_file(file.path());
        assert!(matches!(result, Err(Error::SerializationError(_))));
    }
}
