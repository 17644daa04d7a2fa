//! Core configuration struct and loading logic.
//!
//! This module provides the main [`Config`] struct which aggregates all
//! configuration options for the tack application.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::persistence::{find_config_file, read_config_file, write_config_file};

/// Default number of days a completed task is kept before cleanup.
pub const DEFAULT_RETENTION_DAYS: u32 = 5;

/// Maximum allowed cleanup retention (one year).
pub const MAX_RETENTION_DAYS: u32 = 365;

/// The main configuration struct for the tack application.
///
/// # Examples
///
/// ```
/// use tack_config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.collections.tasks, "tasks");
/// assert_eq!(config.cleanup.retention_days, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Names of the remote collections the store reads and writes.
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Cleanup behavior for completed tasks.
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from the default file locations.
    ///
    /// Searches for configuration files in the following order:
    ///
    /// 1. Local: `./tack.json5` or `./tack.json`
    /// 2. User: `~/.config/tack/config.json5` or `~/.config/tack/config.json`
    ///
    /// If no configuration file is found, returns a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be
    /// read, parsed, or validated.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => {
                let config: Config = read_config_file(&path)?;
                config.validate()?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a collection name is empty or the cleanup
    /// retention is out of range.
    pub fn validate(&self) -> Result<()> {
        self.collections.validate()?;
        self.cleanup.validate()?;
        Ok(())
    }
}

/// Names of the remote collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Collection holding task documents.
    #[serde(default = "default_tasks_collection")]
    pub tasks: String,

    /// Collection holding project documents.
    #[serde(default = "default_projects_collection")]
    pub projects: String,
}

fn default_tasks_collection() -> String {
    "tasks".to_string()
}

fn default_projects_collection() -> String {
    "projects".to_string()
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            tasks: default_tasks_collection(),
            projects: default_projects_collection(),
        }
    }
}

impl CollectionsConfig {
    /// Validates the collection names.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is empty.
    pub fn validate(&self) -> Result<()> {
        for name in [&self.tasks, &self.projects] {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidCollection {
                    reason: "collection name cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Cleanup behavior for completed tasks.
///
/// The scheduled-cleanup operation deletes tasks that have been completed
/// for longer than `retention_days`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// How many days a completed task is kept before it is eligible for
    /// cleanup.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl CleanupConfig {
    /// Validates the retention window.
    ///
    /// # Errors
    ///
    /// Returns an error if the retention is zero or exceeds
    /// [`MAX_RETENTION_DAYS`].
    pub fn validate(&self) -> Result<()> {
        if self.retention_days == 0 {
            return Err(ConfigError::InvalidRetention {
                reason: "retention must be at least one day".to_string(),
            });
        }
        if self.retention_days > MAX_RETENTION_DAYS {
            return Err(ConfigError::InvalidRetention {
                reason: format!(
                    "retention {} exceeds maximum of {} days",
                    self.retention_days, MAX_RETENTION_DAYS
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.collections.tasks, "tasks");
        assert_eq!(config.collections.projects, "projects");
        assert_eq!(config.cleanup.retention_days, DEFAULT_RETENTION_DAYS);
    }

    #[test]
    fn empty_collection_name_is_rejected() {
        let config = Config {
            collections: CollectionsConfig {
                tasks: "  ".to_string(),
                projects: "projects".to_string(),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_retention_is_rejected() {
        let config = Config {
            cleanup: CleanupConfig { retention_days: 0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_retention_is_rejected() {
        let config = Config {
            cleanup: CleanupConfig {
                retention_days: MAX_RETENTION_DAYS + 1,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn deserialize_partial() {
        let json = r#"{"cleanup": {"retention_days": 14}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.cleanup.retention_days, 14);
        assert_eq!(config.collections, CollectionsConfig::default());
    }

    #[test]
    fn serialize_deserialize_roundtrip() {
        let config = Config {
            collections: CollectionsConfig {
                tasks: "team_tasks".to_string(),
                projects: "team_projects".to_string(),
            },
            cleanup: CleanupConfig { retention_days: 30 },
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
