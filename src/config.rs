//! Layered configuration.
//!
//! Settings are merged with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config FILE`, else `config.toml` in the platform config
//!    directory (if it exists)
//! 3. Environment variables prefixed `DUPFILTER_` (e.g. `DUPFILTER_COUNT_MODE=true`)
//! 4. Command-line flags
//!
//! ```toml
//! report_unique = false
//! report_duplicate = "all"   # or 0 / 1 / 2
//! io_threads = 8
//! algorithm = "sha256"
//! output = "json"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::ClassifierConfig;
use crate::output::OutputFormat;
use crate::report::{DuplicateMode, ReportConfig};
use crate::scanner::DigestAlgorithm;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPFILTER_";

/// Errors from loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has a wrongly typed key.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    /// A key parsed but its value is out of range.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key
        key: &'static str,
        /// What is wrong with the value
        message: String,
    },

    /// The effective configuration could not be rendered.
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Include files whose content occurs once.
    pub report_unique: bool,
    /// Which members of duplicate classes to include.
    pub report_duplicate: DuplicateMode,
    /// Print occurrence counts instead of a filtered list.
    pub count_mode: bool,
    /// Worker threads for probing and hashing.
    pub io_threads: usize,
    /// Content digest for same-size files.
    pub algorithm: DigestAlgorithm,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        let report = ReportConfig::default();
        Self {
            report_unique: report.report_unique,
            report_duplicate: report.report_duplicate,
            count_mode: report.count_mode,
            io_threads: 4,
            algorithm: DigestAlgorithm::default(),
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `path` is given but missing, and
    /// `ConfigError::Parse`/`InvalidValue` if any layer is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.is_file() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        match &file {
            Some(f) => log::debug!("Loading config file {}", f.display()),
            None => log::debug!("No config file, using defaults and environment"),
        }

        let figment = Self::figment(file.as_deref()).merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(&figment)
    }

    /// Defaults merged with an optional TOML file (no environment).
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(f) => figment.merge(Toml::file(f)),
            None => figment,
        }
    }

    /// Extract and validate a configuration from any figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Platform config file path (`<config dir>/dupfilter/config.toml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupfilter", "dupfilter")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "io_threads",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command-line overrides, the highest layer.
    #[must_use]
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(unique) = cli.report_unique() {
            self.report_unique = unique;
        }
        if let Some(mode) = cli.report_duplicate() {
            self.report_duplicate = mode;
        }
        if let Some(count) = cli.count_mode() {
            self.count_mode = count;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = usize::from(threads);
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        self
    }

    /// Reporting options.
    #[must_use]
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            report_unique: self.report_unique,
            report_duplicate: self.report_duplicate,
            count_mode: self.count_mode,
        }
    }

    /// Classifier options (without shutdown flag or progress).
    #[must_use]
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig::default()
            .with_io_threads(self.io_threads)
            .with_digester(self.algorithm.digester())
    }

    /// Render as TOML, as accepted by `--config`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
