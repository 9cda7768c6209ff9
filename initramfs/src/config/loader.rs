//! Configuration file loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::tree::EntryKind;

/// Loads configuration files.
///
/// # Examples
///
/// ```no_run
/// use initramfs::config::ConfigLoader;
/// use std::path::Path;
///
/// let config = ConfigLoader::load_file(Path::new("initramfs.yaml")).unwrap();
/// println!("init: {:?}", config.init);
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and parse a YAML configuration file.
    ///
    /// A leading `~` in host paths (`init`, `files` and the sources of
    /// regular `entries`) is expanded to the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the YAML is invalid or a
    /// path cannot be expanded.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read configuration file: {e}"),
        })?;

        log::debug!("loading configuration from {}", path.display());
        Self::parse(&contents)
    }

    /// Parse a YAML configuration and expand `~` in its host paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the YAML is invalid.
    pub fn parse(contents: &str) -> Result<Config> {
        let mut config: Config = serde_yaml::from_str(contents)?;

        if let Some(init) = &config.init {
            config.init = Some(expand_tilde(init)?);
        }
        for file in &mut config.files {
            *file = expand_tilde(file)?;
        }
        for spec in &mut config.entries {
            if spec.kind == EntryKind::Regular && spec.related_path.starts_with('~') {
                let expanded = expand_tilde(Path::new(&spec.related_path))?;
                spec.related_path = expanded.to_string_lossy().into_owned();
            }
        }

        Ok(config)
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8, uses `~user` syntax or
/// the home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use initramfs::config::loader::expand_tilde;
/// use std::path::Path;
///
/// let expanded = expand_tilde(Path::new("~/bin/init")).unwrap();
/// assert!(expanded.ends_with("bin/init"));
///
/// let expanded = expand_tilde(Path::new("/absolute")).unwrap();
/// assert_eq!(expanded, Path::new("/absolute"));
/// ```
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_str().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Path contains invalid UTF-8".to_string(),
    })?;

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = home::home_dir().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "Cannot determine home directory".to_string(),
    })?;

    if path_str == "~" {
        Ok(home)
    } else if let Some(rest) = path_str.strip_prefix("~/") {
        Ok(home.join(rest))
    } else {
        // ~user syntax not supported
        Err(Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "~user syntax is not supported; use ~ or ~/path".to_string(),
        })
    }
}
