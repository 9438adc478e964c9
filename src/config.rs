//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, else `<config_dir>/config.toml`)
//! 3. Environment variables prefixed `DUPESWEEP_` (e.g. `DUPESWEEP_MIN_SIZE`)
//! 4. Command-line flags
//!
//! ```toml
//! min_size = 4096
//! io_threads = 8
//! skip_hidden = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Default minimum file size in bytes.
pub const DEFAULT_MIN_SIZE: u64 = 1024;

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong types.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),

    /// A value parsed but is out of range.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files smaller than this many bytes are ignored.
    pub min_size: u64,
    /// Hashing worker threads.
    pub io_threads: usize,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Move deleted duplicates to the trash.
    pub trash: bool,
    /// Hasher read size in bytes.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            io_threads: DEFAULT_IO_THREADS,
            follow_symlinks: false,
            skip_hidden: false,
            trash: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupesweep", "dupesweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered figment: defaults, file, then environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `explicit` names a missing file.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate a configuration from any figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or a value is out of range.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, file and environment layers.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer is malformed or `explicit` is missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(explicit)?)
    }

    /// Load all layers including the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if loading the lower layers fails.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::load(cli.config.as_deref())?;
        config.apply_cli(cli);
        log::debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Overlay values given on the command line.
    ///
    /// Boolean flags can only switch a setting on.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(min_size) = cli.min_size {
            self.min_size = min_size;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = usize::try_from(threads).unwrap_or(usize::MAX);
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
        self.trash |= cli.trash;
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks, self.skip_hidden, self.min_size)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "io_threads",
                message: "must be at least 1".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "chunk_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
