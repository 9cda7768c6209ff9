//! File tree entries.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path;

/// The kind of an archive entry.
///
/// # Examples
///
/// ```
/// use initramfs::tree::EntryKind;
///
/// let kind: EntryKind = "link".parse().unwrap();
/// assert_eq!(kind, EntryKind::Link);
/// assert!("fifo".parse::<EntryKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EntryKind {
    /// A regular file copied from the host filesystem.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link.
    Link,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Directory => write!(f, "directory"),
            Self::Link => write!(f, "link"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "regular" | "file" => Ok(Self::Regular),
            "directory" | "dir" => Ok(Self::Directory),
            "link" | "symlink" => Ok(Self::Link),
            _ => Err(Error::UnknownEntryKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for EntryKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A node in the archive file tree.
///
/// Each entry is exclusively owned by its parent directory. Directories keep
/// their children sorted by name, so traversal order is reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A regular file whose content is copied from `source` on the host.
    Regular {
        /// Host path of the file content.
        source: PathBuf,
        /// Permission bits override; `None` uses the archive default.
        mode: Option<u32>,
    },
    /// A directory owning its children by name.
    Directory {
        /// Child entries by name.
        children: BTreeMap<String, Entry>,
    },
    /// A symbolic link pointing to an archive path.
    Link {
        /// The link target as stored in the archive.
        target: String,
    },
}

impl Entry {
    /// Creates an empty directory entry.
    #[must_use]
    pub fn new_directory() -> Self {
        Self::Directory {
            children: BTreeMap::new(),
        }
    }

    /// Returns the kind of this entry.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Regular { .. } => EntryKind::Regular,
            Self::Directory { .. } => EntryKind::Directory,
            Self::Link { .. } => EntryKind::Link,
        }
    }

    /// Returns `true` if this entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Returns `true` if this entry is a symbolic link.
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    /// Returns `true` if this entry is a regular file.
    #[must_use]
    pub fn is_regular(&self) -> bool {
        matches!(self, Self::Regular { .. })
    }

    /// Returns the host source path of a regular file.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        match self {
            Self::Regular { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the target of a symbolic link.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Link { target } => Some(target),
            _ => None,
        }
    }

    /// Adds a regular file named `name` to this directory.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotADirectory`] if this entry is not a directory,
    /// [`Error::EntryExists`] if `name` is taken, or [`Error::InvalidName`].
    pub fn add_file(&mut self, name: &str, source: impl Into<PathBuf>) -> Result<&mut Entry> {
        self.add_entry(
            name,
            Self::Regular {
                source: source.into(),
                mode: None,
            },
        )
    }

    /// Adds an empty directory named `name` to this directory.
    ///
    /// # Errors
    ///
    /// Same as [`Entry::add_file`].
    pub fn add_directory(&mut self, name: &str) -> Result<&mut Entry> {
        self.add_entry(name, Self::new_directory())
    }

    /// Adds a symbolic link named `name` pointing at `target`.
    ///
    /// # Errors
    ///
    /// Same as [`Entry::add_file`].
    pub fn add_link(&mut self, name: &str, target: impl Into<String>) -> Result<&mut Entry> {
        self.add_entry(
            name,
            Self::Link {
                target: target.into(),
            },
        )
    }

    /// Inserts a freshly built entry. Existing entries are never replaced.
    pub(crate) fn add_entry(&mut self, name: &str, entry: Entry) -> Result<&mut Entry> {
        path::validate_name(name)?;
        let Self::Directory { children } = self else {
            return Err(Error::NotADirectory {
                path: path::ROOT.to_string(),
            });
        };

        match children.entry(name.to_string()) {
            std::collections::btree_map::Entry::Occupied(_) => Err(Error::EntryExists {
                path: path::join(path::ROOT, name),
            }),
            std::collections::btree_map::Entry::Vacant(slot) => Ok(slot.insert(entry)),
        }
    }

    /// Looks up the direct child `name`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotADirectory`] or [`Error::EntryNotFound`].
    pub fn get(&self, name: &str) -> Result<&Entry> {
        let Self::Directory { children } = self else {
            return Err(Error::NotADirectory {
                path: path::ROOT.to_string(),
            });
        };
        children.get(name).ok_or_else(|| Error::EntryNotFound {
            path: path::join(path::ROOT, name),
        })
    }

    /// Iterates over the children of a directory in name order.
    ///
    /// Non-directories have no children.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Entry)> {
        let children = match self {
            Self::Directory { children } => Some(children),
            _ => None,
        };
        children
            .into_iter()
            .flat_map(|c| c.iter().map(|(name, entry)| (name.as_str(), entry)))
    }

    /// Visits all descendants in pre-order, parents before their children.
    pub(crate) fn walk<F>(&self, base: &str, visit: &mut F) -> Result<()>
    where
        F: FnMut(&str, &Entry) -> Result<()>,
    {
        for (name, entry) in self.children() {
            let entry_path = path::join(base, name);
            visit(&entry_path, entry)?;
            if entry.is_dir() {
                entry.walk(&entry_path, visit)?;
            }
        }
        Ok(())
    }
}

/// Rebases an error produced relative to a single directory onto `dir`.
///
/// Entry-level operations do not know where their directory lives in the
/// tree and report paths relative to it.
pub(crate) fn in_dir(err: Error, dir: &str) -> Error {
    let rebase = |p: String| path::canonicalize(&format!("{dir}{p}"));
    match err {
        Error::NotADirectory { .. } => Error::NotADirectory {
            path: path::canonicalize(dir),
        },
        Error::EntryExists { path } => Error::EntryExists { path: rebase(path) },
        Error::EntryNotFound { path } => Error::EntryNotFound { path: rebase(path) },
        other => other,
    }
}
