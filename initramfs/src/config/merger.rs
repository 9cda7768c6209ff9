//! Configuration merging and precedence handling.
//!
//! This module implements hierarchical merging of configuration sources,
//! with special handling for accumulated fields like `files` and `entries`.

use crate::config::schema::Config;

/// Merges configuration sources according to precedence rules.
///
/// # Examples
///
/// ```
/// use initramfs::config::{Config, ConfigMerger};
///
/// let low = Config { search_path: Some("/lib".to_string()), ..Default::default() };
/// let high = Config { search_path: Some("/usr/lib".to_string()), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.search_path(), "/usr/lib");
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge multiple configurations into one.
    ///
    /// Configurations should be provided in order from lowest to highest
    /// precedence.
    #[must_use]
    pub fn merge(configs: Vec<Config>) -> Config {
        let mut result = Config::default();

        for config in configs {
            Self::merge_into(&mut result, &config);
        }

        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - Files and entries: accumulated, target first
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.init.is_some() {
            target.init.clone_from(&source.init);
        }

        if source.search_path.is_some() {
            target.search_path.clone_from(&source.search_path);
        }

        if source.resolve_libs.is_some() {
            target.resolve_libs = source.resolve_libs;
        }

        target.files.extend(source.files.iter().cloned());
        target.entries.extend(source.entries.iter().cloned());
    }
}
