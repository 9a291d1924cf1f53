use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Windowing options for the reveal/evict controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    /// Entries revealed per load-more request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum rendered units kept materialized at once
    #[serde(default = "default_visible_cap")]
    pub visible_cap: usize,

    /// Rendered extent added between adjacent units
    #[serde(default = "default_unit_spacing")]
    pub unit_spacing: u64,
}

fn default_batch_size() -> usize {
    50
}

fn default_visible_cap() -> usize {
    200
}

fn default_unit_spacing() -> u64 {
    1
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            visible_cap: default_visible_cap(),
            unit_spacing: default_unit_spacing(),
        }
    }
}

/// File logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    /// Enable rolling file logs under the log directory
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration (`[logging]` section)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default log level for stderr output
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for stderr: `pretty`, `json`, `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// File logging
    #[serde(default)]
    pub file: FileLoggingConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format(), file: FileLoggingConfig::default() }
    }
}

/// Top-level viewer configuration loaded from `palaver.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Windowing options
    #[serde(default)]
    pub window: WindowConfig,

    /// Logging options
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.window.batch_size == 0 {
            return Err(Error::Config("window.batch_size must be at least 1".to_string()));
        }
        if self.window.visible_cap == 0 {
            return Err(Error::Config("window.visible_cap must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Example config document with the documented defaults.
    pub fn example() -> &'static str {
        r#"# palaver configuration

[window]
# Entries revealed per load-more request
batch_size = 50
# Maximum rendered units kept materialized at once
visible_cap = 200
# Rendered extent added between adjacent units
unit_spacing = 1

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false
"#
    }
}
