//! Configuration management for the plume engine
//!
//! This module handles loading and validating configuration from environment
//! variables, files, and command-line arguments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::generation::GenerationConfig;
use crate::publish::SiteClientConfig;
use crate::scheduler::{AssignerConfig, DEFAULT_SPACING_DAYS};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scheduling configuration
    pub scheduling: SchedulingConfig,

    /// Generation service configuration
    pub generation: GenerationServiceConfig,

    /// Site publishing configuration
    pub publishing: PublishingConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Scheduling-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Days between consecutive initial placements
    pub spacing_days: u32,

    /// Maximum items per calendar date (absent = unlimited)
    pub max_per_day: Option<usize>,

    /// Furthest initial placement, in days (absent = unlimited)
    pub horizon_days: Option<u32>,
}

/// Generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationServiceConfig {
    /// Generation service endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Language passed to the service
    pub language: String,
}

/// Site publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishingConfig {
    /// Site API request timeout in seconds
    pub timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let spacing_days = std::env::var("PLUME_SPACING_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_SPACING_DAYS);

        let max_per_day = std::env::var("PLUME_MAX_PER_DAY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        let horizon_days = std::env::var("PLUME_HORIZON_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok());

        let generation_endpoint = std::env::var("PLUME_GENERATION_ENDPOINT")
            .unwrap_or_else(|_| String::from("http://localhost:8090"));

        let generation_timeout_secs = std::env::var("PLUME_GENERATION_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(120);

        let language =
            std::env::var("PLUME_GENERATION_LANGUAGE").unwrap_or_else(|_| String::from("en"));

        let publish_timeout_secs = std::env::var("PLUME_SITE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let sqlite_path = std::env::var("PLUME_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/plume.db"))
            .into();

        let log_level = std::env::var("PLUME_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format = std::env::var("PLUME_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            scheduling: SchedulingConfig {
                spacing_days,
                max_per_day,
                horizon_days,
            },
            generation: GenerationServiceConfig {
                endpoint: generation_endpoint,
                timeout_secs: generation_timeout_secs,
                language,
            },
            publishing: PublishingConfig {
                timeout_secs: publish_timeout_secs,
            },
            database: DatabaseConfig { sqlite_path },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scheduling.spacing_days == 0 {
            anyhow::bail!("spacing_days must be greater than 0");
        }

        if self.scheduling.max_per_day == Some(0) {
            anyhow::bail!("max_per_day must be greater than 0 when set");
        }

        if self.generation.timeout_secs == 0 {
            anyhow::bail!("generation timeout must be greater than 0");
        }

        if self.publishing.timeout_secs == 0 {
            anyhow::bail!("publishing timeout must be greater than 0");
        }

        Ok(())
    }

    /// Get generation timeout as Duration
    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }

    /// Build the assigner config for the spacing policy
    pub fn assigner_config(&self) -> AssignerConfig {
        let mut config = AssignerConfig::default().with_spacing_days(self.scheduling.spacing_days);
        if let Some(max) = self.scheduling.max_per_day {
            config = config.with_max_per_day(max);
        }
        if let Some(horizon) = self.scheduling.horizon_days {
            config = config.with_horizon_days(horizon);
        }
        config
    }

    /// Build the generation client config
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            endpoint: self.generation.endpoint.clone(),
            timeout_secs: self.generation.timeout_secs,
            language: self.generation.language.clone(),
        }
    }

    /// Build the site client config
    pub fn site_client_config(&self) -> SiteClientConfig {
        SiteClientConfig {
            timeout_secs: self.publishing.timeout_secs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduling: SchedulingConfig {
                spacing_days: DEFAULT_SPACING_DAYS,
                max_per_day: None,
                horizon_days: None,
            },
            generation: GenerationServiceConfig {
                endpoint: String::from("http://localhost:8090"),
                timeout_secs: 120,
                language: String::from("en"),
            },
            publishing: PublishingConfig { timeout_secs: 30 },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/plume.db"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_spacing() {
        let mut config = Config::default();
        config.scheduling.spacing_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_per_day_cap() {
        let mut config = Config::default();
        config.scheduling.max_per_day = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_assigner_config_mirrors_policy() {
        let mut config = Config::default();
        config.scheduling.spacing_days = 5;
        config.scheduling.max_per_day = Some(2);

        let assigner = config.assigner_config();
        assert_eq!(assigner.spacing_days, 5);
        assert_eq!(assigner.max_per_day, Some(2));
        assert_eq!(assigner.horizon_days, None);
    }

    #[test]
    fn test_generation_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.generation_timeout(), Duration::from_secs(120));
    }
}
