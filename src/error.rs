use std::path::PathBuf;

use thiserror::Error;

/// A configuration that cannot drive a conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("heading_shift must be between 0 and 5, got {0}")]
    HeadingShiftOutOfRange(u8),

    #[error("unsupported export format {0:?} (supported: \"jira\")")]
    UnsupportedExportFormat(String),
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read config file at {config_path}: {source}")]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {config_path}: {source}")]
    Invalid {
        config_path: PathBuf,
        source: ConfigError,
    },
}
