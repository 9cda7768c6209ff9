//! CPIO archive serialization.
//!
//! The Linux kernel unpacks an initramfs from a CPIO archive in the "newc"
//! format: every record is an ASCII-hex header, the NUL-terminated entry
//! name and the entry body, with name and body each padded to four bytes.
//! The archive ends with a record named [`header::TRAILER_NAME`].
//!
//! [`ArchiveWriter`] is the seam between the file tree and the output
//! format. [`CpioWriter`] implements it on top of any [`Write`].
//!
//! # Examples
//!
//! ```
//! use initramfs::cpio::{ArchiveWriter, CpioWriter};
//!
//! let mut writer = CpioWriter::new(Vec::new());
//! writer.write_directory("/lib").unwrap();
//! writer.write_link("/lib64", "/lib").unwrap();
//! writer.close().unwrap();
//!
//! let bytes = writer.into_inner();
//! assert!(bytes.starts_with(b"070701"));
//! assert_eq!(bytes.len() % 4, 0);
//! ```

pub mod header;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::{Error, Result};
use header::{Header, PERM_MASK, S_IFDIR, S_IFLNK, S_IFREG, TRAILER_NAME};

/// Writes file tree entries into an archive.
///
/// Names are absolute archive paths. Implementations write entries in the
/// order they are called; callers are responsible for writing a directory
/// before its contents.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveWriter {
    /// Writes a regular file named `name` with the content of the host file
    /// `source`.
    ///
    /// A `mode` of `0` keeps the permission bits of `source`; any other value
    /// replaces them.
    ///
    /// # Errors
    ///
    /// Fails if `source` cannot be opened or is not a regular file, or if
    /// writing fails.
    fn write_regular(&mut self, name: &str, source: &Path, mode: u32) -> Result<()>;

    /// Writes a directory named `name`.
    ///
    /// # Errors
    ///
    /// Fails if writing fails.
    fn write_directory(&mut self, name: &str) -> Result<()>;

    /// Writes a symbolic link named `name` pointing at `target`.
    ///
    /// # Errors
    ///
    /// Fails if writing fails.
    fn write_link(&mut self, name: &str, target: &str) -> Result<()>;
}

/// Streams a "newc" CPIO archive into a byte sink.
///
/// Inode numbers are assigned sequentially from 1. All records are owned by
/// root. [`CpioWriter::close`] must be called to write the trailer; entries
/// written afterwards are rejected.
#[derive(Debug)]
pub struct CpioWriter<W: Write> {
    inner: W,
    offset: u64,
    next_ino: u32,
    closed: bool,
}

impl<W: Write> CpioWriter<W> {
    /// Creates a writer emitting to `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            offset: 0,
            next_ino: 1,
            closed: false,
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns `true` once the trailer has been written.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes the trailer record and flushes the sink.
    ///
    /// Closing an already closed writer does nothing.
    ///
    /// # Errors
    ///
    /// Fails if writing the trailer or flushing fails.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let trailer = Header {
            nlink: 1,
            ..Header::default()
        };
        self.write_encoded(TRAILER_NAME, &trailer)?;
        self.closed = true;
        self.inner.flush().map_err(|source| Error::WriteHeader {
            name: TRAILER_NAME.to_string(),
            source,
        })?;

        log::debug!("wrote archive trailer at offset {}", self.offset);
        Ok(())
    }

    /// Consumes the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_header(&mut self, name: &str, mut header: Header) -> Result<()> {
        if self.closed {
            return Err(Error::ArchiveClosed);
        }

        header.ino = self.next_ino;
        self.next_ino = self.next_ino.wrapping_add(1);
        self.write_encoded(name, &header)
    }

    fn write_encoded(&mut self, name: &str, header: &Header) -> Result<()> {
        let buf = header.encode(name, self.offset);
        self.inner
            .write_all(&buf)
            .map_err(|source| Error::WriteHeader {
                name: name.to_string(),
                source,
            })?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn write_body<R: Read>(&mut self, name: &str, body: &mut R, expected: u64) -> Result<()> {
        let body_err = |source: io::Error| Error::WriteBody {
            name: name.to_string(),
            source,
        };

        let copied = io::copy(body, &mut self.inner).map_err(body_err)?;
        self.offset += copied;
        if copied != expected {
            return Err(Error::BodySizeMismatch {
                name: name.to_string(),
                expected,
                actual: copied,
            });
        }

        let pad = header::padding(self.offset);
        self.inner
            .write_all(&[0u8; 3][..pad as usize])
            .map_err(body_err)?;
        self.offset += pad;
        Ok(())
    }
}

impl<W: Write> ArchiveWriter for CpioWriter<W> {
    fn write_regular(&mut self, name: &str, source: &Path, mode: u32) -> Result<()> {
        let open_err = |source_err: io::Error| Error::OpenSource {
            path: source.to_path_buf(),
            source: source_err,
        };

        let mut file = File::open(source).map_err(open_err)?;
        let metadata = file.metadata().map_err(open_err)?;
        if !metadata.is_file() {
            return Err(Error::NotRegularFile {
                path: source.to_path_buf(),
            });
        }

        let size = metadata.len();
        let filesize = u32::try_from(size).map_err(|_| Error::WriteHeader {
            name: name.to_string(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("file of {size} bytes exceeds the format limit"),
            ),
        })?;

        let perm = if mode == 0 {
            source_permissions(&metadata)
        } else {
            mode & PERM_MASK
        };
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| {
                u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX)
            });

        self.write_header(
            name,
            Header {
                mode: S_IFREG | perm,
                nlink: 1,
                mtime,
                filesize,
                ..Header::default()
            },
        )?;
        self.write_body(name, &mut file, size)?;

        log::debug!("wrote {name} ({size} bytes, mode {perm:o})");
        Ok(())
    }

    fn write_directory(&mut self, name: &str) -> Result<()> {
        self.write_header(
            name,
            Header {
                mode: S_IFDIR | 0o777,
                nlink: 2,
                ..Header::default()
            },
        )?;
        log::debug!("wrote {name}/");
        Ok(())
    }

    fn write_link(&mut self, name: &str, target: &str) -> Result<()> {
        let size = target.len() as u64;
        let filesize = u32::try_from(size).map_err(|_| Error::WriteHeader {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "link target too long"),
        })?;

        self.write_header(
            name,
            Header {
                mode: S_IFLNK | 0o777,
                nlink: 1,
                filesize,
                ..Header::default()
            },
        )?;
        self.write_body(name, &mut target.as_bytes(), size)?;

        log::debug!("wrote {name} -> {target}");
        Ok(())
    }
}

#[cfg(unix)]
fn source_permissions(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & PERM_MASK
}

#[cfg(not(unix))]
fn source_permissions(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o555
    } else {
        0o755
    }
}
