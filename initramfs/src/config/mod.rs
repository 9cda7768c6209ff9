//! Configuration system for initramfs.
//!
//! This module provides layered configuration with support for:
//! - A YAML configuration file
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//! - Validation
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`INITRAMFS_*`)
//! 3. Configuration file (`ConfigBuilder::with_config_file` or `INITRAMFS_CONFIG`)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use initramfs::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_config_file("initramfs.yaml")
//!     .build()
//!     .unwrap();
//!
//! println!("search path: {:?}", initramfs::config::search_paths(config.search_path()));
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

use std::path::PathBuf;

pub use crate::elf::DEFAULT_SEARCH_PATH;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::ConfigLoader;
pub use merger::ConfigMerger;
pub use schema::Config;
pub use validator::ConfigValidator;

/// Splits a colon-separated search path into directories.
///
/// Empty segments are dropped. A search path without any directory selects
/// [`DEFAULT_SEARCH_PATH`].
///
/// # Examples
///
/// ```
/// use initramfs::config::search_paths;
/// use std::path::PathBuf;
///
/// assert_eq!(
///     search_paths("/usr/lib::/lib:"),
///     vec![PathBuf::from("/usr/lib"), PathBuf::from("/lib")]
/// );
/// assert_eq!(search_paths("")[0], PathBuf::from("/lib"));
/// ```
#[must_use]
pub fn search_paths(search_path: &str) -> Vec<PathBuf> {
    let split = |s: &str| -> Vec<PathBuf> {
        s.split(':')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(PathBuf::from)
            .collect()
    };

    let paths = split(search_path);
    if paths.is_empty() {
        split(DEFAULT_SEARCH_PATH)
    } else {
        paths
    }
}
