//! Layered configuration construction.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::error::Result;

/// Builds the effective configuration from all sources.
///
/// Sources from lowest to highest precedence: built-in defaults, the
/// configuration file, environment variables, programmatic overrides. The
/// result is validated.
///
/// # Examples
///
/// ```
/// use initramfs::config::{Config, ConfigBuilder};
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .skip_env()
///     .with_config(Config {
///         init: Some(PathBuf::from("/bin/busybox")),
///         ..Default::default()
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(config.init, Some(PathBuf::from("/bin/busybox")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    skip_env: bool,
    overrides: Vec<Config>,
}

impl ConfigBuilder {
    /// Creates a builder with no sources besides the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the given configuration file.
    ///
    /// Without an explicit file, the file named by `INITRAMFS_CONFIG` is
    /// loaded unless the environment is skipped.
    #[must_use]
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Ignores all environment variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Adds a programmatic configuration with the highest precedence.
    ///
    /// Later calls take precedence over earlier ones.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides.push(config);
        self
    }

    /// Loads, merges and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded, an
    /// environment variable is invalid or validation fails.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        let config_file = match self.config_file {
            Some(path) => Some(path),
            None if !self.skip_env => EnvironmentConfig::config_file(),
            None => None,
        };
        if let Some(path) = config_file {
            let file_config = ConfigLoader::load_file(&path)?;
            ConfigMerger::merge_into(&mut config, &file_config);
        }

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        for overrides in &self.overrides {
            ConfigMerger::merge_into(&mut config, overrides);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}
