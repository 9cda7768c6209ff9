//! Dynamically linked library resolution for ELF files.
//!
//! An ELF executable or shared object lists the libraries it needs by name
//! (`DT_NEEDED` entries in its dynamic section, e.g. `libc.so.6`). The
//! [`ElfLibResolver`] maps those names to files by probing an ordered list of
//! search directories, the same way the dynamic loader does, and then
//! recursively resolves the libraries of every library it finds.
//!
//! # Examples
//!
//! ```no_run
//! use initramfs::elf::ElfLibResolver;
//! use std::path::Path;
//!
//! let mut resolver = ElfLibResolver::new(["/lib", "/usr/lib"]);
//! resolver.resolve(Path::new("/bin/sh")).unwrap();
//! for lib in resolver.libs() {
//!     println!("{}", lib.display());
//! }
//! ```

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use elf::abi;
use elf::endian::AnyEndian;
use elf::ElfBytes;

use crate::error::{Error, Result};
use crate::path;

/// Default library search path, used when none is configured.
pub const DEFAULT_SEARCH_PATH: &str =
    "/lib:/lib64:/usr/lib:/usr/lib64:/lib/x86_64-linux-gnu:/usr/lib/x86_64-linux-gnu";

/// The four bytes every ELF file starts with.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// A library name that resolved to a file with a different base name.
///
/// This is the common `libfoo.so.1 -> libfoo.so.1.2.3` symlink layout. The
/// archive keeps the real file and needs an extra link under the requested
/// name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryAlias {
    /// The name as listed in the dynamic section.
    pub name: String,
    /// The resolved absolute path of the library.
    pub path: PathBuf,
}

/// Resolves dynamically linked libraries of ELF files.
///
/// Libraries are collected deduplicated, keyed by their fully symlink
/// resolved absolute path, across all files passed to
/// [`ElfLibResolver::resolve`]. The order of [`ElfLibResolver::libs`] is the
/// order of first discovery in a depth-first walk of the import graph.
#[derive(Debug, Clone)]
pub struct ElfLibResolver {
    search_paths: Vec<PathBuf>,
    libs: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
    aliases: Vec<LibraryAlias>,
}

impl Default for ElfLibResolver {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

impl ElfLibResolver {
    /// Creates a resolver probing `search_paths` in order.
    ///
    /// If no search paths are given, [`DEFAULT_SEARCH_PATH`] is used.
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut search_paths: Vec<PathBuf> = search_paths.into_iter().map(Into::into).collect();
        if search_paths.is_empty() {
            search_paths = DEFAULT_SEARCH_PATH.split(':').map(PathBuf::from).collect();
        }

        Self {
            search_paths,
            libs: Vec::new(),
            seen: HashSet::new(),
            aliases: Vec::new(),
        }
    }

    /// Returns the directories probed for libraries, in priority order.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Returns the libraries resolved so far.
    #[must_use]
    pub fn libs(&self) -> &[PathBuf] {
        &self.libs
    }

    /// Returns library names whose resolved file has a different base name.
    #[must_use]
    pub fn aliases(&self) -> &[LibraryAlias] {
        &self.aliases
    }

    /// Resolves the libraries required by the ELF file at `elf_path`.
    ///
    /// Each newly found library is added and its own libraries are resolved
    /// before the next name is looked at. Libraries that were already
    /// resolved are skipped.
    ///
    /// # Errors
    ///
    /// - [`Error::ElfRead`] if `elf_path` or a found library is not readable
    ///   as ELF.
    /// - [`Error::UnresolvedLibrary`] if a name exists in no search path.
    /// - [`Error::LibraryProbe`] if probing a search path fails for any
    ///   reason other than the file not existing.
    ///
    /// On error the libraries collected so far are incomplete and must not
    /// be used.
    pub fn resolve(&mut self, elf_path: &Path) -> Result<()> {
        for name in linked_libs(elf_path)? {
            let path = self.find(&name)?.ok_or_else(|| Error::UnresolvedLibrary {
                name: name.clone(),
            })?;

            self.record_alias(&name, &path);

            if self.seen.contains(&path) {
                continue;
            }

            log::debug!(
                "{} needs {name}: {}",
                elf_path.display(),
                path.display()
            );
            self.seen.insert(path.clone());
            self.libs.push(path.clone());
            self.resolve(&path)?;
        }

        Ok(())
    }

    /// Finds `name` in the first search path that has it.
    fn find(&self, name: &str) -> Result<Option<PathBuf>> {
        for dir in &self.search_paths {
            let candidate = dir.join(name);
            match fs::canonicalize(&candidate) {
                Ok(path) => return Ok(Some(path)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(Error::LibraryProbe {
                        path: candidate,
                        source,
                    })
                }
            }
        }
        Ok(None)
    }

    fn record_alias(&mut self, name: &str, resolved: &Path) {
        if path::validate_name(name).is_err() {
            return;
        }
        let same_name = resolved
            .file_name()
            .is_some_and(|file_name| file_name == name);
        if same_name || self.aliases.iter().any(|alias| alias.name == name) {
            return;
        }

        self.aliases.push(LibraryAlias {
            name: name.to_string(),
            path: resolved.to_path_buf(),
        });
    }
}

/// Reads the names of the libraries the ELF file at `path` links against.
///
/// Files without a dynamic section (static executables) link nothing and
/// yield an empty list.
///
/// # Errors
///
/// Returns [`Error::ElfRead`] if the file cannot be read, is not ELF, or its
/// dynamic section is malformed.
pub fn linked_libs(path: &Path) -> Result<Vec<String>> {
    let read_err = |reason: String| Error::ElfRead {
        path: path.to_path_buf(),
        reason,
    };

    let data = fs::read(path).map_err(|e| read_err(e.to_string()))?;
    let file =
        ElfBytes::<AnyEndian>::minimal_parse(&data).map_err(|e| read_err(e.to_string()))?;

    let Some(shdrs) = file.section_headers() else {
        return Ok(Vec::new());
    };
    let Some(dynamic_shdr) = shdrs.iter().find(|shdr| shdr.sh_type == abi::SHT_DYNAMIC) else {
        return Ok(Vec::new());
    };

    let strtab_shdr = shdrs
        .get(dynamic_shdr.sh_link as usize)
        .map_err(|e| read_err(format!("dynamic string table: {e}")))?;
    let strtab = file
        .section_data_as_strtab(&strtab_shdr)
        .map_err(|e| read_err(format!("dynamic string table: {e}")))?;
    let Some(dynamic) = file
        .dynamic()
        .map_err(|e| read_err(format!("dynamic section: {e}")))?
    else {
        return Ok(Vec::new());
    };

    dynamic
        .iter()
        .filter(|d| d.d_tag == abi::DT_NEEDED)
        .map(|d| {
            let offset = usize::try_from(d.d_val())
                .map_err(|_| read_err("library name offset out of range".to_string()))?;
            strtab
                .get(offset)
                .map(ToString::to_string)
                .map_err(|e| read_err(format!("library name: {e}")))
        })
        .collect()
}

/// Checks whether the file at `path` starts with the ELF magic.
///
/// # Errors
///
/// Returns [`Error::OpenSource`] if the file cannot be opened or read.
pub fn is_elf(path: &Path) -> Result<bool> {
    let open_err = |source: io::Error| Error::OpenSource {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(open_err)?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == ELF_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(open_err(e)),
    }
}
