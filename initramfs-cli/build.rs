//! Build script for initramfs-cli.
//!
//! This script generates the man page at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Archive content arguments shared by `build` and `list`.
fn archive_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("init")
            .help("Program placed at /init in the archive")
            .value_name("INIT"),
    )
    .arg(
        Arg::new("files")
            .help("Extra files placed under /files")
            .value_name("FILES")
            .num_args(0..),
    )
    .arg(
        Arg::new("search-path")
            .long("search-path")
            .help("Colon-separated library search path")
            .value_name("PATHS"),
    )
    .arg(
        Arg::new("no-libs")
            .long("no-libs")
            .help("Do not add shared libraries")
            .action(clap::ArgAction::SetTrue),
    )
}

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("mkinitramfs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build Linux initramfs archives")
        .long_about(
            "Build a CPIO archive usable as Linux initramfs from an init program, \
             extra files and the shared libraries they link against",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Load configuration from a YAML file")
                .value_name("PATH")
                .global(true)
                .env("INITRAMFS_CONFIG"),
        )
        .subcommands(vec![
            archive_args(
                Command::new("build")
                    .about("Write an initramfs archive")
                    .long_about("Write the archive to a file or to standard output"),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .help("Write the archive to PATH instead of standard output")
                    .value_name("PATH"),
            ),
            archive_args(
                Command::new("list")
                    .about("List the planned archive content")
                    .long_about("Show every entry the archive would contain without writing it"),
            )
            .arg(
                Arg::new("format")
                    .long("format")
                    .help("Output format")
                    .value_name("FORMAT")
                    .value_parser(["text", "json"])
                    .default_value("text"),
            ),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() {
    // Generate man pages at build time
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let app = build_cli();
    let man = Man::new(app);
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("mkinitramfs.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
