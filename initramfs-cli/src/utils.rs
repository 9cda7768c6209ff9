//! Utility functions for CLI operations.
//!
//! This module provides the pieces shared by the `build` and `list`
//! commands: the archive content arguments, configuration loading and
//! assembling an archive from the effective configuration.

use crate::error::CliError;
use clap::Args;
use initramfs::{Archive, Config, ConfigBuilder};
use std::path::PathBuf;

/// Global CLI options shared across all commands.
///
/// Verbosity is consumed by the logger in `main` and is not carried here.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration file to load.
    pub config: Option<PathBuf>,
}

/// Arguments describing the archive content.
#[derive(Args, Debug, Clone, Default)]
pub struct ArchiveArgs {
    /// Program placed at /init in the archive
    #[arg(value_name = "INIT")]
    pub init: Option<PathBuf>,

    /// Extra files placed under /files
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Colon-separated library search path
    #[arg(long, value_name = "PATHS")]
    pub search_path: Option<String>,

    /// Do not add shared libraries
    #[arg(long)]
    pub no_libs: bool,
}

impl ArchiveArgs {
    /// Converts the arguments into the highest precedence configuration.
    fn to_config(&self) -> Config {
        Config {
            init: self.init.clone(),
            files: self.files.clone(),
            search_path: self.search_path.clone(),
            resolve_libs: self.no_libs.then_some(false),
            entries: Vec::new(),
        }
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Command-line arguments (highest priority)
/// 2. Environment variables
/// 3. Configuration file
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions, args: &ArchiveArgs) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();
    if let Some(ref path) = global.config {
        builder = builder.with_config_file(path);
    }

    builder
        .with_config(args.to_config())
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Assemble the archive described by `config`.
///
/// Extra files and entries are added in configuration order, then shared
/// libraries are resolved unless disabled.
pub fn assemble_archive(config: &Config) -> Result<Archive, CliError> {
    let init = config.init.as_ref().ok_or_else(|| {
        CliError::InvalidArguments(
            "no init file given (pass INIT or set init in the configuration file)".to_string(),
        )
    })?;

    let mut archive = Archive::new(init);
    archive.add_files(&config.files)?;
    for spec in &config.entries {
        archive.add_spec(spec)?;
    }

    if config.should_resolve_libs() {
        archive.resolve_linked_libs(config.search_path())?;
    } else {
        log::info!("library resolution disabled");
    }

    Ok(archive)
}
