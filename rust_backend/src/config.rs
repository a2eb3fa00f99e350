//! Annotation configuration.
//!
//! [`AnnotateConfig`] is built once at the boundary (defaults, a TOML file, or CLI flags)
//! and passed down by reference; nothing below it holds mutable defaults.
//!
//! ```toml
//! pattern = '.*([0-9]{4})-?([0-9]{2})-?([0-9]{2})_([0-9]{2})?-?([0-9]{2})?-?([0-9]{2})?.*?'
//! timezone = "Europe/Berlin"
//! failure_policy = "skip"
//! write_strategy = "bulk"
//!
//! [window]
//! sunrise_minutes = 10
//! sunset_minutes = 10
//! dawn_minutes = 0
//! dusk_minutes = 0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnnotationError, AnnotationResult};
use crate::parsing::filepath::{TimestampPattern, DEFAULT_PATTERN};
use crate::solar::DayPhaseWindow;
use crate::time::zone::{resolve_timezone, DEFAULT_TIMEZONE};

/// Name of the configuration file searched by [`AnnotateConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "daystamp.toml";

/// What happens when a record's path cannot be turned into a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first bad record; nothing is written.
    #[default]
    Abort,
    /// Log the record, leave its output fields null and continue.
    Skip,
}

/// How computed columns are written back to the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStrategy {
    /// One column write per output field.
    #[default]
    Bulk,
    /// One write per record and field.
    PerRecord,
}

/// Immutable annotation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// Fallback the command line front end passes when `--pattern` is omitted.
    /// [`crate::annotation::AnnotateParams::resolve`] never reads it: library and
    /// Python callers must supply a pattern for `source = "filepath"`.
    pub pattern: String,
    /// Zone attached to naive timestamps when the caller does not supply one.
    pub timezone: String,
    pub window: DayPhaseWindow,
    pub failure_policy: FailurePolicy,
    pub write_strategy: WriteStrategy,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            window: DayPhaseWindow::default(),
            failure_policy: FailurePolicy::default(),
            write_strategy: WriteStrategy::default(),
        }
    }
}

impl AnnotateConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AnnotateConfig)` if the file parses and validates
    /// * `Err(AnnotationError::Config)` if it cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnnotationResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AnnotationError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> AnnotationResult<Self> {
        let config: AnnotateConfig = toml::from_str(content)
            .map_err(|e| AnnotationError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `daystamp.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// Falls back to [`AnnotateConfig::default`] when no file exists.
    pub fn from_default_location() -> AnnotationResult<Self> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            Path::new("rust_backend").join(CONFIG_FILE_NAME),
            Path::new("..").join(CONFIG_FILE_NAME),
        ];

        match search_paths.iter().find(|path| path.exists()) {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Check that the pattern compiles with six groups and the timezone resolves.
    pub fn validate(&self) -> AnnotationResult<()> {
        TimestampPattern::new(&self.pattern)?;
        resolve_timezone(&self.timezone)?;
        Ok(())
    }
}
