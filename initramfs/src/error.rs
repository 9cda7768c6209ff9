//! Error types for the initramfs library.
//!
//! This module provides the error hierarchy for every stage of building an
//! archive: file tree construction, ELF library resolution, CPIO
//! serialization and configuration, using `thiserror` for ergonomic error
//! handling.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an initramfs error.
///
/// # Examples
///
/// ```
/// use initramfs::{Error, Result};
///
/// fn example_operation() -> Result<&'static str> {
///     Ok("/init")
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the initramfs library.
///
/// Every variant carries the archive path, host path or library name it
/// relates to, so a message localizes the failure on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// An entry that must be a directory is not one.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The archive path of the offending entry.
        path: String,
    },

    /// An entry with the same name already exists in the directory.
    #[error("entry exists: {path}")]
    EntryExists {
        /// The archive path that is already taken.
        path: String,
    },

    /// A looked up entry does not exist.
    #[error("entry does not exist: {path}")]
    EntryNotFound {
        /// The archive path that could not be resolved.
        path: String,
    },

    /// Following symbolic links inside the archive did not terminate.
    #[error("symlink loop detected: {path}")]
    SymlinkLoop {
        /// The archive path being resolved.
        path: String,
    },

    /// An entry name is not a single valid path segment.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// A host filesystem path cannot be used.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A file could not be read or parsed as ELF.
    #[error("read ELF {}: {reason}", path.display())]
    ElfRead {
        /// The file that was read.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A library is required but exists in none of the search paths.
    #[error("lib could not be resolved: {name}")]
    UnresolvedLibrary {
        /// The library name from the dynamic section, e.g. `libc.so.6`.
        name: String,
    },

    /// Probing a search path failed for a reason other than absence.
    #[error("probe library {}: {source}", path.display())]
    LibraryProbe {
        /// The candidate path that was probed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A regular archive entry's source is a directory or special file.
    #[error("not a regular file: {}", path.display())]
    NotRegularFile {
        /// The source path.
        path: PathBuf,
    },

    /// A regular archive entry's source could not be opened.
    #[error("open file {}: {source}", path.display())]
    OpenSource {
        /// The source path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing an entry header failed.
    #[error("write header for {name}: {source}")]
    WriteHeader {
        /// The archive name of the entry.
        name: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing an entry body failed.
    #[error("write body for {name}: {source}")]
    WriteBody {
        /// The archive name of the entry.
        name: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The streamed body length differs from the size in the header.
    #[error("body size mismatch for {name}: header says {expected} bytes, copied {actual}")]
    BodySizeMismatch {
        /// The archive name of the entry.
        name: String,
        /// The size written to the header.
        expected: u64,
        /// The number of bytes actually copied.
        actual: u64,
    },

    /// An entry was written after the trailer.
    #[error("archive writer is closed")]
    ArchiveClosed,

    /// An entry kind is not one of regular, directory or link.
    #[error("unknown file type {kind}")]
    UnknownEntryKind {
        /// The rejected kind.
        kind: String,
    },

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if the error reports an already existing entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use initramfs::Error;
    ///
    /// let err = Error::EntryExists { path: "/lib".to_string() };
    /// assert!(err.is_entry_exists());
    /// ```
    #[must_use]
    pub fn is_entry_exists(&self) -> bool {
        matches!(self, Self::EntryExists { .. })
    }

    /// Check if the error reports a missing archive entry.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. })
    }

    /// Check if the error reports a non-directory where a directory is needed.
    #[must_use]
    pub fn is_not_a_directory(&self) -> bool {
        matches!(self, Self::NotADirectory { .. })
    }
}
