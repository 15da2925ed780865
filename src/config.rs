//! Compressor configuration.
//!
//! Loaded from a `config.toml` when one is given; every field has a default,
//! so a config file only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! directory = "compressed"           # Root of the content store
//! collection = "Pictures/squishpic"  # Sub-directory compressed images go to
//!
//! [compression]
//! tier = "medium"                    # low | medium | high
//!
//! [processing]
//! max_workers = 4                    # Max parallel jobs (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::QualityTier;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Compressor configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressorConfig {
    /// Where compressed images are written.
    pub output: OutputConfig,
    /// Defaults applied to requests that don't say otherwise.
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl CompressorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.collection.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.collection must not be empty".into(),
            ));
        }
        let collection = Path::new(&self.output.collection);
        if collection.is_absolute()
            || collection
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(ConfigError::Validation(
                "output.collection must be a relative path without '..'".into(),
            ));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Content store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Root directory of the store.
    pub directory: PathBuf,
    /// Destination collection below the root.
    pub collection: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("compressed"),
            collection: "Pictures/squishpic".to_string(),
        }
    }
}

/// Request defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Tier used when a request names none.
    pub tier: QualityTier,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of jobs running at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_workers
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Load config from a TOML file and validate it.
pub fn load_config(path: &Path) -> Result<CompressorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: CompressorConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path` if given, stock defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<CompressorConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CompressorConfig::default()),
    }
}

/// A documented stock `config.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# squishpic configuration
# All options are optional - uncomment and change what you need.

[output]
# Root directory of the content store.
directory = "compressed"
# Sub-directory of the root that compressed images are filed under.
collection = "Pictures/squishpic"

[compression]
# Default quality tier: "low" (q60, 40%), "medium" (q70, 50%), "high" (q80, 75%).
# Percentages bound the longer edge relative to the original.
tier = "medium"

[processing]
# Maximum number of images compressed at once.
# Omit to use all CPU cores; larger values are clamped to the core count.
# max_workers = 4
"#
}
