//! Translator configuration via `tessera.toml`
//!
//! Both translators take their settings from one small TOML file. A missing
//! section falls back to its defaults, so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_core::{Error, Limits, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// What the read path does with buffered rows no parent claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Drop them silently
    Ignore,
    /// Drop them and log a warning
    #[default]
    Warn,
    /// Fail the read with a corruption error
    Error,
}

/// Read path settings (`[r2d]` section)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct R2DConfig {
    /// Handling of orphan rows
    pub orphan_policy: OrphanPolicy,
}

/// Translator configuration loaded from `tessera.toml`.
///
/// # Example
///
/// ```toml
/// [limits]
/// max_nesting_depth = 128
/// max_array_len = 1000000
/// max_field_name_bytes = 1024
///
/// [r2d]
/// orphan_policy = "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Limits checked before a document is translated
    pub limits: Limits,
    /// Read path settings
    pub r2d: R2DConfig,
}

impl TranslatorConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Tessera translator configuration

# Documents over any of these limits are rejected before any row is produced.
[limits]
max_nesting_depth = 128
max_array_len = 1000000
max_field_name_bytes = 1024

# Read path.
#   orphan_policy: what to do with rows whose parent never showed up
#     "ignore" = drop silently
#     "warn"   = drop and log a warning (default)
#     "error"  = fail the read as corrupted
[r2d]
orphan_policy = "warn"
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid TOML, has an unknown
    /// orphan policy, or sets a zero limit.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TranslatorConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.max_nesting_depth == 0
            || limits.max_array_len == 0
            || limits.max_field_name_bytes == 0
        {
            return Err(Error::Config("limits must be greater than zero".to_string()));
        }
        Ok(())
    }
}
