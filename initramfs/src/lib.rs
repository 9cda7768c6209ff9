#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # initramfs
//!
//! A library for building Linux initramfs images.
//!
//! An initramfs is a CPIO archive the kernel unpacks into its initial root
//! filesystem. This library assembles one from an init program, extra files
//! and every shared library those files need.
//!
//! ## Core Types
//!
//! - [`Archive`]: the image under construction and its build steps
//! - [`FileTree`] and [`Entry`]: the in-memory archive namespace
//! - [`ElfLibResolver`]: transitive shared library resolution for ELF files
//! - [`CpioWriter`] and [`ArchiveWriter`]: "newc" CPIO serialization
//! - [`Config`] and [`ConfigBuilder`]: layered configuration
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```no_run
//! use initramfs::Archive;
//! use std::fs::File;
//!
//! let mut archive = Archive::new("/usr/bin/my-init");
//! archive.add_files(["/etc/hostname", "/usr/bin/busybox"]).unwrap();
//! archive.resolve_linked_libs("").unwrap();
//!
//! let image = File::create("initramfs.cpio").unwrap();
//! archive.write_cpio(image).unwrap();
//! ```

pub mod archive;
pub mod config;
pub mod cpio;
pub mod elf;
pub mod error;
pub mod logging;
pub mod output;
pub mod path;
pub mod tree;

// Re-export key types at crate root for convenience
pub use archive::{Archive, ArchiveEntry, FileSpec, DEFAULT_MODE, FILES_DIR, LIBS_DIR};
pub use config::{Config, ConfigBuilder};
pub use cpio::{ArchiveWriter, CpioWriter};
pub use elf::{ElfLibResolver, LibraryAlias, DEFAULT_SEARCH_PATH};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use output::{ListFormat, ListFormatter};
pub use tree::{Entry, EntryKind, FileTree};
