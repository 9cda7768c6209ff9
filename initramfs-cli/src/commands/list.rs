//! List command implementation.
//!
//! This module implements the `list` command, which displays the planned
//! archive content as text or JSON without writing an archive.

use crate::error::CliError;
use crate::utils::{assemble_archive, load_configuration, ArchiveArgs, GlobalOptions};
use clap::{Args, ValueEnum};
use initramfs::{ListFormat, ListFormatter};
use std::io::Write;

/// List the planned archive content.
#[derive(Args)]
pub struct ListCommand {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

/// Output format for list command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per entry (human-readable)
    Text,
    /// JSON format
    Json,
}

impl From<OutputFormat> for ListFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ListFormat::Text,
            OutputFormat::Json => ListFormat::Json,
        }
    }
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Load configuration
        let config = load_configuration(global, &self.archive)?;

        // 2. Assemble the file tree and its libraries
        let archive = assemble_archive(&config)?;

        // 3. Format and output to stdout
        let formatter = ListFormat::from(self.format).create_formatter();
        let output = formatter.format(&archive.entries())?;

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{output}")?;

        Ok(())
    }
}
