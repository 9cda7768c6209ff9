//! Configuration validation.
//!
//! This module checks configuration values before anything is added to an
//! archive, so mistakes are reported with the field they come from.

use std::path::Path;

use crate::archive::FileSpec;
use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::path;
use crate::tree::EntryKind;

/// Validates configuration values.
///
/// # Examples
///
/// ```
/// use initramfs::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
///
/// let config = Config { search_path: Some("lib".to_string()), ..Default::default() };
/// assert!(ConfigValidator::validate(&config).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first invalid field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref init) = config.init {
            Self::validate_host_file("init", init)?;
        }

        for file in &config.files {
            Self::validate_host_file("files", file)?;
        }

        if let Some(ref search_path) = config.search_path {
            Self::validate_search_path(search_path)?;
        }

        for (index, spec) in config.entries.iter().enumerate() {
            Self::validate_entry(&format!("entries[{index}]"), spec)?;
        }

        Ok(())
    }

    /// A host file must have a base name, which becomes its archive name.
    fn validate_host_file(field: &str, file: &Path) -> Result<()> {
        path::base_name(file).map_err(|e| Error::Validation {
            field: field.into(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every non-empty search path segment must be absolute.
    fn validate_search_path(search_path: &str) -> Result<()> {
        for segment in search_path
            .split(':')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            if !segment.starts_with('/') {
                return Err(Error::Validation {
                    field: "search_path".into(),
                    message: format!("search path '{segment}' is not absolute"),
                });
            }
        }
        Ok(())
    }

    fn validate_entry(field: &str, spec: &FileSpec) -> Result<()> {
        let invalid = |message: String| Error::Validation {
            field: field.into(),
            message,
        };

        let (_, name) = path::split(&spec.archive_path);
        if name.is_empty() {
            return Err(invalid(format!(
                "archive path '{}' is the archive root",
                spec.archive_path
            )));
        }
        if spec.archive_path.contains('\0') {
            return Err(invalid("archive path contains a NUL byte".to_string()));
        }

        match spec.kind {
            EntryKind::Regular if spec.related_path.is_empty() => {
                return Err(invalid("regular entry needs a source in related_path".to_string()));
            }
            EntryKind::Link if spec.related_path.is_empty() => {
                return Err(invalid("link entry needs a target in related_path".to_string()));
            }
            EntryKind::Directory if !spec.related_path.is_empty() => {
                return Err(invalid("directory entry takes no related_path".to_string()));
            }
            _ => {}
        }

        if let Some(mode) = spec.mode {
            if spec.kind != EntryKind::Regular {
                return Err(invalid(format!("{} entry takes no mode", spec.kind)));
            }
            if mode > 0o7777 {
                return Err(invalid(format!("mode {mode:o} exceeds 7777")));
            }
        }

        Ok(())
    }
}
