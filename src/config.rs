//! Resizer configuration module.
//!
//! Handles loading, validating, and merging `image-resizer.toml`. Stock
//! defaults are serialized to a TOML table and the user file is merged on
//! top, so a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! The CLI reads the file named by `--config`. Without the flag it looks for
//! `image-resizer.toml` in the working directory, and a missing file means
//! stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [cache]
//! # dir = "/tmp/image-resizer"  # Working and output files (default: system temp dir)
//!
//! [defaults]
//! format = "jpeg"           # Output format when --format is not given
//! quality = 80              # Encoder quality (0-100)
//! mode = "contain"          # stretch | contain | cover
//!
//! [logging]
//! level = "warn"            # Used when RUST_LOG is not set
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{FitMode, supported_output_formats};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is named.
pub const CONFIG_FILE_NAME: &str = "image-resizer.toml";

const CACHE_DIR_NAME: &str = "image-resizer";
const FIT_MODES: &[&str] = &["stretch", "contain", "cover"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `image-resizer.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Where working copies and outputs are written.
    pub cache: CacheConfig,
    /// Request defaults for values not given on the command line.
    pub defaults: DefaultsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Cache root. `None` means `<system temp dir>/image-resizer`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub format: String,
    pub quality: u32,
    pub mode: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: crate::resize::DEFAULT_FORMAT.to_string(),
            quality: 80,
            mode: FitMode::default().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.quality > 100 {
            return Err(ConfigError::Validation(
                "defaults.quality must be 0-100".into(),
            ));
        }
        let format = self.defaults.format.to_ascii_lowercase();
        if !supported_output_formats().any(|f| f == format) {
            return Err(ConfigError::Validation(format!(
                "defaults.format '{}' is not a supported output format",
                self.defaults.format
            )));
        }
        if !FIT_MODES.contains(&self.defaults.mode.as_str()) {
            return Err(ConfigError::Validation(format!(
                "defaults.mode must be one of {}",
                FIT_MODES.join(", ")
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Resolved cache root.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache
            .dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(CACHE_DIR_NAME))
    }

    pub fn fit_mode(&self) -> FitMode {
        FitMode::parse(&self.defaults.mode)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResizerConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ResizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ResizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the resizer config.
///
/// An explicitly named file must exist. Otherwise `image-resizer.toml` in
/// the working directory is used when present, and stock defaults when not.
pub fn load_config(explicit: Option<&Path>) -> Result<ResizerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(CONFIG_FILE_NAME))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `image-resizer.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Resizer Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Cache
# ---------------------------------------------------------------------------
[cache]
# Directory for working copies and resize outputs. Files here are never
# cleaned up automatically.
# Omit to use "image-resizer" inside the system temp directory.
# dir = "/var/cache/image-resizer"

# ---------------------------------------------------------------------------
# Request defaults (overridden by command-line flags)
# ---------------------------------------------------------------------------
[defaults]
# Output format: png, jpeg/jpg, webp, avif, bmp, tiff/tif, gif.
format = "jpeg"

# Encoder quality (0 = worst, 100 = best). Used by JPEG and AVIF;
# PNG and WebP output is lossless.
quality = 80

# How the source is fitted into the target box:
#   stretch - exact target size, aspect ratio not preserved
#   contain - fit inside the box
#   cover   - fill the box, one side may overflow
mode = "contain"

# ---------------------------------------------------------------------------
# Logging (stderr)
# ---------------------------------------------------------------------------
[logging]
# trace, debug, info, warn, error or off. RUST_LOG takes precedence.
level = "warn"
"##
}
