//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `INITRAMFS_*` environment variables that
//! override configuration file values.

use std::env;
use std::path::PathBuf;

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Path of a configuration file to load.
pub const CONFIG_ENV: &str = "INITRAMFS_CONFIG";

/// Library search path override.
pub const SEARCH_PATH_ENV: &str = "INITRAMFS_SEARCH_PATH";

/// Library resolution switch.
pub const RESOLVE_LIBS_ENV: &str = "INITRAMFS_RESOLVE_LIBS";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use initramfs::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if `INITRAMFS_RESOLVE_LIBS` is not a boolean.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(search_path) = env::var(SEARCH_PATH_ENV) {
            config.search_path = Some(search_path);
        }

        if let Ok(val) = env::var(RESOLVE_LIBS_ENV) {
            config.resolve_libs = Some(Self::parse_bool(RESOLVE_LIBS_ENV, &val)?);
        }

        Ok(())
    }

    /// Returns the configuration file named by `INITRAMFS_CONFIG`, if set
    /// and not empty.
    #[must_use]
    pub fn config_file() -> Option<PathBuf> {
        env::var_os(CONFIG_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
