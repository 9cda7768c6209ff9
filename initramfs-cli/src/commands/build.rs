//! Build command implementation.
//!
//! This module implements the `build` command, which writes the archive to a
//! file or to standard output.

use crate::error::CliError;
use crate::utils::{assemble_archive, load_configuration, ArchiveArgs, GlobalOptions};
use clap::Args;
use initramfs::Archive;
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Write an initramfs archive.
#[derive(Args)]
pub struct BuildCommand {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Write the archive to PATH instead of standard output
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl BuildCommand {
    /// Execute the build command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Load configuration
        let config = load_configuration(global, &self.archive)?;

        // 2. Assemble the file tree and its libraries
        let archive = assemble_archive(&config)?;

        // 3. Serialize
        match self.output {
            Some(ref path) => write_to_file(&archive, path),
            None => write_to_stdout(&archive),
        }
    }
}

/// Write the archive to `path`, removing the partial file on failure.
fn write_to_file(archive: &Archive, path: &Path) -> Result<(), CliError> {
    let file = File::create(path)?;
    let mut sink = BufWriter::new(file);

    let result = archive
        .write_cpio(&mut sink)
        .map_err(CliError::from)
        .and_then(|()| sink.flush().map_err(CliError::from));

    if result.is_err() {
        drop(sink);
        if let Err(e) = fs::remove_file(path) {
            log::warn!("failed to remove incomplete archive {}: {e}", path.display());
        }
    } else {
        log::info!("wrote {}", path.display());
    }

    result
}

/// Write the archive to standard output.
fn write_to_stdout(archive: &Archive) -> Result<(), CliError> {
    let stdout = io::stdout();
    if stdout.is_terminal() {
        return Err(CliError::InvalidArguments(
            "refusing to write the archive to a terminal (use --output or redirect stdout)"
                .to_string(),
        ));
    }

    let mut sink = BufWriter::new(stdout.lock());
    archive.write_cpio(&mut sink)?;
    sink.flush()?;
    Ok(())
}
