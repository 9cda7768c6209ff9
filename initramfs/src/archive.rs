//! Building initramfs archives.
//!
//! An [`Archive`] owns the file tree of the image under construction. The
//! init program always lives at `/init`, extra files under [`FILES_DIR`] and
//! resolved shared libraries under [`LIBS_DIR`]. Every search path the
//! libraries were looked up in becomes a link to `/lib` inside the image, so
//! the dynamic loader finds them under the paths it knows.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config;
use crate::cpio::{ArchiveWriter, CpioWriter};
use crate::elf::{self, ElfLibResolver};
use crate::error::{Error, Result};
use crate::path;
use crate::tree::{Entry, EntryKind, FileTree};

/// The archive directory for resolved shared libraries.
pub const LIBS_DIR: &str = "lib";

/// The archive directory for extra files beside the init program.
pub const FILES_DIR: &str = "files";

/// The archive path of the init program.
pub const INIT_NAME: &str = "init";

/// Permission bits of regular files without an explicit mode.
pub const DEFAULT_MODE: u32 = 0o755;

/// Describes a single archive entry.
///
/// The meaning of `related_path` depends on `kind`: the host source path of
/// a regular file, the target of a link, unused for a directory.
///
/// # Examples
///
/// ```
/// use initramfs::{Archive, FileSpec};
///
/// let mut archive = Archive::new("/bin/busybox");
/// archive.add_spec(&FileSpec::link("/bin/sh", "/init")).unwrap();
/// archive.add_spec(&FileSpec::directory("/proc")).unwrap();
///
/// let paths: Vec<String> = archive.entries().into_iter().map(|e| e.path).collect();
/// assert_eq!(paths, vec!["/bin", "/bin/sh", "/init", "/proc"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSpec {
    /// Absolute path inside the archive.
    pub archive_path: String,
    /// The kind of entry.
    pub kind: EntryKind,
    /// Source path or link target, depending on `kind`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub related_path: String,
    /// Permission bits of a regular file; `0` keeps the source's own bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

impl FileSpec {
    /// A regular file at `archive_path` copied from `source`.
    pub fn regular(archive_path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            archive_path: archive_path.into(),
            kind: EntryKind::Regular,
            related_path: source.into(),
            mode: None,
        }
    }

    /// A directory at `archive_path`.
    pub fn directory(archive_path: impl Into<String>) -> Self {
        Self {
            archive_path: archive_path.into(),
            kind: EntryKind::Directory,
            related_path: String::new(),
            mode: None,
        }
    }

    /// A symbolic link at `archive_path` pointing at `target`.
    pub fn link(archive_path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            archive_path: archive_path.into(),
            kind: EntryKind::Link,
            related_path: target.into(),
            mode: None,
        }
    }

    /// Sets the permission bits of a regular file.
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Writes this entry alone, without parent directories, to `writer`.
    ///
    /// # Errors
    ///
    /// Propagates errors of `writer`.
    pub fn write_to<W: ArchiveWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let name = path::canonicalize(&self.archive_path);
        match self.kind {
            EntryKind::Regular => {
                writer.write_regular(&name, Path::new(&self.related_path), self.mode.unwrap_or(0))
            }
            EntryKind::Directory => writer.write_directory(&name),
            EntryKind::Link => writer.write_link(&name, &self.related_path),
        }
    }

    fn to_entry(&self) -> Result<Entry> {
        let missing = |what: &str| Error::InvalidPath {
            path: PathBuf::from(&self.archive_path),
            reason: format!("{} entry needs {what}", self.kind),
        };

        Ok(match self.kind {
            EntryKind::Regular if self.related_path.is_empty() => return Err(missing("a source")),
            EntryKind::Regular => Entry::Regular {
                source: PathBuf::from(&self.related_path),
                mode: self.mode,
            },
            EntryKind::Directory => Entry::new_directory(),
            EntryKind::Link if self.related_path.is_empty() => return Err(missing("a target")),
            EntryKind::Link => Entry::Link {
                target: self.related_path.clone(),
            },
        })
    }
}

/// One line of an archive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    /// Absolute path inside the archive.
    pub path: String,
    /// The kind of entry.
    pub kind: EntryKind,
    /// Host source path of a regular file or target of a link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_path: Option<String>,
    /// Permission bits of a regular file; `0` keeps the source's own bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

/// A file tree usable as initramfs for the Linux kernel.
///
/// Create one with [`Archive::new`], add files with [`Archive::add_files`],
/// [`Archive::add_file`] or [`Archive::add_spec`], resolve the shared
/// libraries of everything added so far with
/// [`Archive::resolve_linked_libs`] and serialize it with
/// [`Archive::write_cpio`].
///
/// # Examples
///
/// ```no_run
/// use initramfs::Archive;
///
/// let mut archive = Archive::new("/bin/sh");
/// archive.add_files(["/etc/hostname"]).unwrap();
/// archive.resolve_linked_libs("").unwrap();
///
/// let mut image = Vec::new();
/// archive.write_cpio(&mut image).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Archive {
    tree: FileTree,
}

impl Archive {
    /// Creates an archive with `init` added as `/init`.
    pub fn new(init: impl Into<PathBuf>) -> Self {
        let mut tree = FileTree::new();
        // An empty root cannot reject a valid name.
        let _ = tree.add_file(path::ROOT, INIT_NAME, init);
        Self { tree }
    }

    /// Returns the file tree of the archive.
    #[must_use]
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Adds `source` to [`FILES_DIR`] as `name`, or as its base name if no
    /// name is given.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EntryExists`] if the name is taken,
    /// [`Error::InvalidPath`] if `source` has no base name, or
    /// [`Error::InvalidName`] if `name` is not a single path segment.
    pub fn add_file(&mut self, name: Option<&str>, source: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref();
        let name = match name {
            Some(name) => name.to_string(),
            None => path::base_name(source)?,
        };

        let dir = path::join(path::ROOT, FILES_DIR);
        self.tree.mkdir(&dir)?;
        self.tree.add_file(&dir, &name, source)?;
        log::debug!("added {} as {}", source.display(), path::join(&dir, &name));
        Ok(())
    }

    /// Adds every file in `sources` to [`FILES_DIR`] under its base name.
    ///
    /// Nothing is created if `sources` is empty.
    ///
    /// # Errors
    ///
    /// Same as [`Archive::add_file`]; files before the failing one stay
    /// added.
    pub fn add_files<I, P>(&mut self, sources: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for source in sources {
            self.add_file(None, source)?;
        }
        Ok(())
    }

    /// Adds the entry described by `spec`, creating missing parent
    /// directories.
    ///
    /// Adding a directory that already exists succeeds.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidPath`] for the root path or a spec missing
    /// its source or target, and with the tree errors of the insertion.
    pub fn add_spec(&mut self, spec: &FileSpec) -> Result<()> {
        let (dir, name) = path::split(&spec.archive_path);
        if name.is_empty() {
            return Err(Error::InvalidPath {
                path: PathBuf::from(&spec.archive_path),
                reason: "the archive root cannot be replaced".to_string(),
            });
        }

        let entry = spec.to_entry()?;
        self.tree.mkdir(&dir)?;
        if entry.is_dir() {
            self.tree.mkdir(&path::join(&dir, &name))?;
        } else {
            self.tree.add_entry(&dir, &name, entry)?;
        }

        log::debug!("added {} {}", spec.kind, path::join(&dir, &name));
        Ok(())
    }

    /// Resolves the shared libraries of all regular files in the archive.
    ///
    /// `search_path` is a colon-separated list of host directories; an empty
    /// string uses [`elf::DEFAULT_SEARCH_PATH`]. Regular files that are not
    /// ELF files are skipped. Resolved libraries are added to [`LIBS_DIR`]
    /// under their base name, and every search path that does not already
    /// lead to `/lib` inside the archive becomes a link to it. A search path
    /// already present in the archive is left as it is. If no library is
    /// found, the archive stays unchanged.
    ///
    /// # Errors
    ///
    /// Fails with the resolver errors ([`Error::ElfRead`],
    /// [`Error::UnresolvedLibrary`], [`Error::LibraryProbe`]) or with
    /// [`Error::EntryExists`] if two libraries share a base name.
    pub fn resolve_linked_libs(&mut self, search_path: &str) -> Result<()> {
        let search_paths = config::search_paths(search_path);
        let mut resolver = ElfLibResolver::new(search_paths.clone());

        let mut sources = Vec::new();
        self.tree.walk(|_, entry| {
            if let Some(source) = entry.source() {
                sources.push(source.to_path_buf());
            }
            Ok(())
        })?;

        for source in &sources {
            if !elf::is_elf(source)? {
                log::debug!("skipping {}: not an ELF file", source.display());
                continue;
            }
            resolver.resolve(source)?;
        }

        if resolver.libs().is_empty() {
            log::debug!("no linked libraries found");
            return Ok(());
        }

        let lib_dir = path::join(path::ROOT, LIBS_DIR);
        self.tree.mkdir(&lib_dir)?;
        for lib in resolver.libs() {
            let name = path::base_name(lib)?;
            self.tree.add_file(&lib_dir, &name, lib)?;
            log::info!("adding library {}", lib.display());
        }

        for alias in resolver.aliases() {
            let target = path::base_name(&alias.path)?;
            match self.tree.add_link(&lib_dir, &alias.name, target) {
                Ok(_) => log::debug!("linked {}/{} to {}", lib_dir, alias.name, alias.path.display()),
                Err(e) if e.is_entry_exists() => {}
                Err(e) => return Err(e),
            }
        }

        for search_path in &search_paths {
            self.link_search_path(&search_path.to_string_lossy(), &lib_dir)?;
        }

        Ok(())
    }

    fn link_search_path(&mut self, search_path: &str, lib_dir: &str) -> Result<()> {
        let resolved = self.tree.resolve(search_path)?;
        if resolved == lib_dir {
            return Ok(());
        }

        let (parent, name) = path::split(&resolved);
        if name.is_empty() {
            log::warn!("search path {search_path} resolves to the archive root, not linking");
            return Ok(());
        }

        self.tree.mkdir(&parent)?;
        match self.tree.add_link(&parent, &name, lib_dir) {
            Ok(_) => log::debug!("linked {resolved} to {lib_dir}"),
            Err(e) if e.is_entry_exists() => {
                log::warn!("search path {search_path} already exists in the archive, not linking");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Returns every entry in the order it will be written.
    #[must_use]
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        let mut entries = Vec::new();
        // The visitor never fails.
        let _ = self.tree.walk(|path, entry| {
            let (related_path, mode) = match entry {
                Entry::Regular { source, mode } => (
                    Some(source.display().to_string()),
                    Some(mode.unwrap_or(DEFAULT_MODE)),
                ),
                Entry::Directory { .. } => (None, None),
                Entry::Link { target } => (Some(target.clone()), None),
            };
            entries.push(ArchiveEntry {
                path: path.to_string(),
                kind: entry.kind(),
                related_path,
                mode,
            });
            Ok(())
        });
        entries
    }

    /// Writes every entry to `writer`, directories before their contents.
    ///
    /// # Errors
    ///
    /// Returns the first error of `writer`.
    pub fn write_to<W: ArchiveWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.tree.walk(|path, entry| match entry {
            Entry::Regular { source, mode } => {
                writer.write_regular(path, source, mode.unwrap_or(DEFAULT_MODE))
            }
            Entry::Directory { .. } => writer.write_directory(path),
            Entry::Link { target } => writer.write_link(path, target),
        })
    }

    /// Writes the archive in CPIO "newc" format to `sink`.
    ///
    /// The trailer is written even if writing an entry fails. On error the
    /// output is incomplete and must be discarded.
    ///
    /// # Errors
    ///
    /// Returns the first error writing the entries, or else the error of
    /// writing the trailer.
    pub fn write_cpio<W: Write>(&self, sink: W) -> Result<()> {
        let mut writer = CpioWriter::new(sink);
        let written = self.write_to(&mut writer);
        let closed = writer.close();
        written?;
        closed
    }
}
