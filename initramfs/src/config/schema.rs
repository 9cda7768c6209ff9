//! Configuration schema definitions.
//!
//! This module defines the configuration structure describing what goes into
//! an archive: the init program, extra files, arbitrary entries and how
//! shared libraries are resolved.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::archive::FileSpec;

/// Complete configuration structure.
///
/// Every field is optional so that configurations from several sources can
/// be merged.
///
/// # Examples
///
/// ```
/// use initramfs::config::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     init: Some(PathBuf::from("/bin/busybox")),
///     search_path: Some("/usr/lib".to_string()),
///     ..Default::default()
/// };
/// assert!(config.should_resolve_libs());
/// ```
///
/// The YAML form:
///
/// ```
/// use initramfs::config::Config;
///
/// let yaml = r#"
/// init: /usr/bin/my-init
/// files:
///   - /etc/hostname
/// search_path: /usr/lib:/usr/lib64
/// entries:
///   - archive_path: /bin/sh
///     kind: link
///     related_path: /init
/// "#;
/// let config: Config = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.files.len(), 1);
/// assert_eq!(config.entries.len(), 1);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Host path of the program placed at `/init`.
    pub init: Option<PathBuf>,

    /// Extra files placed under `/files` by base name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,

    /// Colon-separated library search path.
    pub search_path: Option<String>,

    /// Whether shared libraries are resolved and added.
    pub resolve_libs: Option<bool>,

    /// Additional archive entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<FileSpec>,
}

impl Config {
    /// Returns the effective library search path string.
    ///
    /// An unset search path is empty, which selects the default.
    #[must_use]
    pub fn search_path(&self) -> &str {
        self.search_path.as_deref().unwrap_or("")
    }

    /// Returns whether shared libraries should be resolved (default: yes).
    #[must_use]
    pub fn should_resolve_libs(&self) -> bool {
        self.resolve_libs.unwrap_or(true)
    }
}
