use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("data_dir cannot be empty")]
    EmptyDataDir,

    #[error("Invalid {0} interval: must be at least 1 second")]
    InvalidInterval(&'static str),

    #[error("Invalid window_minutes: {0}. Must be at least 1")]
    InvalidWindow(i64),

    #[error("Invalid escalation_threshold: {0}. Must be at least 1")]
    InvalidEscalationThreshold(usize),

    #[error("Invalid classifier timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Classifier base_url cannot be empty when use_llm is set")]
    EmptyBaseUrl,

    #[error("Invalid fanout capacity: {0}. Must be at least 1")]
    InvalidCapacity(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. floorwatch.yaml in the working directory
    /// 3. Environment variables (FLOORWATCH_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("floorwatch.yaml"))
            .merge(Env::prefixed("FLOORWATCH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("FLOORWATCH_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        if config.producers.shopfloor_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval("shopfloor"));
        }
        if config.producers.order_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval("order"));
        }
        if config.producers.safety_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval("safety"));
        }
        if config.supervisor.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval("supervisor"));
        }

        if config.supervisor.window_minutes < 1 {
            return Err(ConfigError::InvalidWindow(config.supervisor.window_minutes));
        }
        if config.supervisor.escalation_threshold == 0 {
            return Err(ConfigError::InvalidEscalationThreshold(
                config.supervisor.escalation_threshold,
            ));
        }

        if config.classifier.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.classifier.timeout_secs));
        }
        if config.classifier.use_llm && config.classifier.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.fanout.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(config.fanout.capacity));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_pass_validation() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.supervisor.escalation_threshold, 3);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_dir: /var/lib/floorwatch\nsupervisor:\n  window_minutes: 15\n  escalation_threshold: 5"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, "/var/lib/floorwatch");
        assert_eq!(config.supervisor.window_minutes, 15);
        assert_eq!(config.supervisor.escalation_threshold, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.producers.shopfloor_interval_secs, 8);
        assert_eq!(config.fanout.capacity, 256);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "producers:\n  order_interval_secs: 0").unwrap();
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut config = Config::default();
        config.supervisor.escalation_threshold = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidEscalationThreshold(0))
        ));
    }

    #[test]
    fn llm_mode_requires_base_url() {
        let mut config = Config::default();
        config.classifier.use_llm = true;
        config.classifier.base_url = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyBaseUrl)
        ));
    }
}
