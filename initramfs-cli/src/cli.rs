//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{BuildCommand, CompletionsCommand, ListCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for building Linux initramfs archives.
#[derive(Parser)]
#[command(name = "mkinitramfs")]
#[command(version, about = "Build Linux initramfs archives", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Load configuration from a YAML file
    #[arg(long, value_name = "PATH", global = true, env = "INITRAMFS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write an initramfs archive
    Build(BuildCommand),

    /// List the planned archive content
    List(ListCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
