use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, LoadError};

/// Largest accepted `heading_shift`.
pub const MAX_HEADING_SHIFT: u8 = 5;

/// Documented default configuration, embedded at compile time.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Conversion settings.
///
/// Every field is optional in a config file; missing keys take the values of
/// [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Headings whose line is suppressed while their content is kept.
    pub omit_headings: Vec<String>,
    /// Headings whose whole section is dropped.
    pub ignore_sections: Vec<String>,
    pub heading_shift: u8,
    pub convert_headings_to_bold: bool,
    pub keep_image_descriptions: bool,
    pub export_format: String,
    /// Output directory for the command-line tool. Not used by the converter.
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            omit_headings: Vec::new(),
            ignore_sections: Vec::new(),
            heading_shift: 0,
            convert_headings_to_bold: false,
            keep_image_descriptions: true,
            export_format: ExportFormat::Jira.as_str().to_string(),
            export_path: PathBuf::from("exports"),
        }
    }
}

/// Target notations the emitter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jira,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Jira => "jira",
        }
    }

    /// File extension used for converted output.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jira => "jira",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jira" => Ok(ExportFormat::Jira),
            _ => Err(ConfigError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

impl Config {
    /// Check the settings and resolve the export format.
    pub fn validate(&self) -> Result<ExportFormat, ConfigError> {
        if self.heading_shift > MAX_HEADING_SHIFT {
            return Err(ConfigError::HeadingShiftOutOfRange(self.heading_shift));
        }
        self.export_format.parse()
    }

    /// Load config from a TOML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, LoadError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(config_path).map_err(|source| LoadError::Read {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| LoadError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        config.validate().map_err(|source| LoadError::Invalid {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        Ok(Some(config))
    }
}
