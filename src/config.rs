//! Organizer settings loaded from TOML configuration files.
//!
//! Settings can come from a configuration file, from command-line flags, or
//! both; flags win field by field. Every setting is optional.
//!
//! # Configuration File Format
//!
//! ```toml
//! [organize]
//! older_than_days = 30
//! larger_than_mb = 100.0
//! file_types = ["txt", "pdf", "docx"]
//! log_file = "cleaning_log.txt"
//! ```
//!
//! A relative `log_file` is resolved against the directory being organized.

use crate::file_organizer::OrganizeOptions;
use crate::move_log::DEFAULT_LOG_FILE_NAME;
use crate::policy::ClassificationPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while loading or validating settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    /// Age threshold must be a positive number of days.
    #[error("Invalid age threshold {0}: expected a positive number of days")]
    InvalidAgeThreshold(u64),
    /// Size threshold must be a positive, finite number of megabytes.
    #[error("Invalid size threshold {0}: expected a positive number of MB")]
    InvalidSizeThreshold(f64),
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizerConfig {
    #[serde(default)]
    pub organize: OrganizeSettings,
}

/// The `[organize]` table. Also used to carry command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizeSettings {
    /// Move files last modified more than this many days ago to `Old Files`.
    pub older_than_days: Option<u64>,
    /// Move files larger than this many MB to `Large Files`.
    pub larger_than_mb: Option<f64>,
    /// Only process files with these extensions.
    pub file_types: Option<Vec<String>>,
    /// Where to append move records.
    pub log_file: Option<PathBuf>,
}

impl OrganizeSettings {
    /// Returns these settings with every field set in `overrides` replaced.
    pub fn merged_with(self, overrides: OrganizeSettings) -> Self {
        Self {
            older_than_days: overrides.older_than_days.or(self.older_than_days),
            larger_than_mb: overrides.larger_than_mb.or(self.larger_than_mb),
            file_types: overrides.file_types.or(self.file_types),
            log_file: overrides.log_file.or(self.log_file),
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.declutter.toml` in the current directory
    /// 3. Look for `~/.config/declutter/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any file found is not valid.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".declutter.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("declutter")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Merges `overrides` on top of this configuration and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a threshold is zero, negative or not finite.
    pub fn resolve(
        self,
        base_path: &Path,
        overrides: OrganizeSettings,
    ) -> Result<OrganizeOptions, ConfigError> {
        let settings = self.organize.merged_with(overrides);

        let mut policy = ClassificationPolicy::new();
        if let Some(days) = settings.older_than_days {
            policy = policy.with_age_threshold_days(validate_age_threshold(days)?);
        }
        if let Some(mb) = settings.larger_than_mb {
            policy = policy.with_size_threshold_mb(validate_size_threshold(mb)?);
        }
        if let Some(types) = settings.file_types {
            policy = policy.with_allowed_extensions(types);
        }

        let log_file = match settings.log_file {
            Some(path) if path.is_absolute() => path,
            Some(path) => base_path.join(path),
            None => base_path.join(DEFAULT_LOG_FILE_NAME),
        };

        Ok(OrganizeOptions {
            policy,
            log_file,
            dry_run: false,
        })
    }
}

/// Accepts an age threshold of at least one day.
pub fn validate_age_threshold(days: u64) -> Result<u64, ConfigError> {
    if days == 0 {
        return Err(ConfigError::InvalidAgeThreshold(days));
    }
    Ok(days)
}

/// Accepts a size threshold that is finite and strictly positive.
pub fn validate_size_threshold(mb: f64) -> Result<f64, ConfigError> {
    if !mb.is_finite() || mb <= 0.0 {
        return Err(ConfigError::InvalidSizeThreshold(mb));
    }
    Ok(mb)
}
