//! The rooted archive file tree.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::path;
use crate::tree::entry::{in_dir, Entry};

/// Upper bound of symbolic links followed while resolving one path.
///
/// Matches the Linux `MAXSYMLINKS` limit.
pub const MAX_LINK_HOPS: usize = 40;

/// A hierarchy of archive entries below a root directory.
///
/// The tree models the namespace of the archive independent of the real
/// filesystem. Entries are only ever created below existing directories, so
/// the tree is acyclic by construction.
///
/// # Examples
///
/// ```
/// use initramfs::tree::FileTree;
///
/// let mut tree = FileTree::new();
/// tree.mkdir("/usr/lib").unwrap();
/// tree.add_link("/usr", "lib64", "/lib").unwrap();
///
/// assert!(tree.get_entry("/usr/lib").unwrap().is_dir());
/// assert_eq!(tree.get_entry("/usr/lib64").unwrap().target(), Some("/lib"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTree {
    root: Entry,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    /// Creates a tree with an empty root directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Entry::new_directory(),
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Entry {
        &self.root
    }

    /// Returns the root directory for modification.
    pub fn root_mut(&mut self) -> &mut Entry {
        &mut self.root
    }

    /// Resolves `path` from the root.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EntryNotFound`] if a component is missing or
    /// [`Error::NotADirectory`] if a non-terminal component is not a
    /// directory.
    pub fn get_entry(&self, path: &str) -> Result<&Entry> {
        let mut current = &self.root;
        let mut walked = String::new();
        for segment in path::segments(path) {
            let parent = path::canonicalize(&walked);
            walked = path::join(&walked, &segment);
            current = match current {
                Entry::Directory { children } => {
                    children.get(&segment).ok_or_else(|| Error::EntryNotFound {
                        path: walked.clone(),
                    })?
                }
                _ => return Err(Error::NotADirectory { path: parent }),
            };
        }
        Ok(current)
    }

    /// Resolves `path` from the root for modification.
    ///
    /// # Errors
    ///
    /// Same as [`FileTree::get_entry`].
    pub fn get_entry_mut(&mut self, path: &str) -> Result<&mut Entry> {
        let mut current = &mut self.root;
        let mut walked = String::new();
        for segment in path::segments(path) {
            let parent = path::canonicalize(&walked);
            walked = path::join(&walked, &segment);
            current = match current {
                Entry::Directory { children } => {
                    children
                        .get_mut(&segment)
                        .ok_or_else(|| Error::EntryNotFound {
                            path: walked.clone(),
                        })?
                }
                _ => return Err(Error::NotADirectory { path: parent }),
            };
        }
        Ok(current)
    }

    /// Creates the directory at `path` and all missing parents.
    ///
    /// Existing directories along the path are reused, so calling this twice
    /// with the same path returns the same node and creates nothing new.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotADirectory`] if any component already exists as
    /// something other than a directory.
    pub fn mkdir(&mut self, path: &str) -> Result<&mut Entry> {
        let mut current = &mut self.root;
        let mut walked = String::new();
        for segment in path::segments(path) {
            path::validate_name(&segment)?;
            walked = path::join(&walked, &segment);
            let Entry::Directory { children } = current else {
                return Err(Error::NotADirectory { path: walked });
            };
            if !children.contains_key(&segment) {
                log::debug!("creating directory {walked}");
            }
            let child = children
                .entry(segment)
                .or_insert_with(Entry::new_directory);
            if !child.is_dir() {
                return Err(Error::NotADirectory { path: walked });
            }
            current = child;
        }
        Ok(current)
    }

    /// Adds a regular file `name` below the existing directory `dir`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EntryNotFound`] if `dir` does not exist,
    /// [`Error::NotADirectory`] if it is not a directory, or
    /// [`Error::EntryExists`] if `name` is already taken.
    pub fn add_file(
        &mut self,
        dir: &str,
        name: &str,
        source: impl Into<PathBuf>,
    ) -> Result<&mut Entry> {
        self.get_entry_mut(dir)?
            .add_file(name, source)
            .map_err(|e| in_dir(e, dir))
    }

    /// Adds an empty directory `name` below the existing directory `dir`.
    ///
    /// # Errors
    ///
    /// Same as [`FileTree::add_file`].
    pub fn add_directory(&mut self, dir: &str, name: &str) -> Result<&mut Entry> {
        self.get_entry_mut(dir)?
            .add_directory(name)
            .map_err(|e| in_dir(e, dir))
    }

    /// Adds a symbolic link `name` below the existing directory `dir`.
    ///
    /// # Errors
    ///
    /// Same as [`FileTree::add_file`].
    pub fn add_link(
        &mut self,
        dir: &str,
        name: &str,
        target: impl Into<String>,
    ) -> Result<&mut Entry> {
        self.get_entry_mut(dir)?
            .add_link(name, target)
            .map_err(|e| in_dir(e, dir))
    }

    /// Adds a prepared entry below the existing directory `dir`.
    pub(crate) fn add_entry(&mut self, dir: &str, name: &str, entry: Entry) -> Result<&mut Entry> {
        self.get_entry_mut(dir)?
            .add_entry(name, entry)
            .map_err(|e| in_dir(e, dir))
    }

    /// Resolves `path` inside the archive, following symbolic links.
    ///
    /// Absolute link targets restart at the root, relative targets are taken
    /// relative to the link's directory. Components that do not exist are
    /// kept lexically, so the result is where `path` would land once the
    /// archive is unpacked.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::SymlinkLoop`] after [`MAX_LINK_HOPS`] links.
    ///
    /// # Examples
    ///
    /// ```
    /// use initramfs::tree::FileTree;
    ///
    /// let mut tree = FileTree::new();
    /// tree.mkdir("/lib").unwrap();
    /// tree.mkdir("/usr").unwrap();
    /// tree.add_link("/usr", "lib", "/lib").unwrap();
    ///
    /// assert_eq!(tree.resolve("/usr/lib/x86_64-linux-gnu").unwrap(), "/lib/x86_64-linux-gnu");
    /// ```
    pub fn resolve(&self, path: &str) -> Result<String> {
        let mut pending: VecDeque<String> = path::segments(path).into();
        let mut resolved = path::ROOT.to_string();
        let mut hops = 0;

        while let Some(segment) = pending.pop_front() {
            let candidate = path::join(&resolved, &segment);
            match self.get_entry(&candidate) {
                Ok(Entry::Link { target }) => {
                    hops += 1;
                    if hops > MAX_LINK_HOPS {
                        return Err(Error::SymlinkLoop {
                            path: path::canonicalize(path),
                        });
                    }
                    let target = if target.starts_with(path::SEPARATOR) {
                        target.clone()
                    } else {
                        path::join(&resolved, target)
                    };
                    let mut rest: VecDeque<String> = path::segments(&target).into();
                    rest.extend(pending.drain(..));
                    pending = rest;
                    resolved = path::ROOT.to_string();
                }
                _ => resolved = candidate,
            }
        }

        Ok(resolved)
    }

    /// Visits every entry except the root in pre-order.
    ///
    /// Each directory is visited before its children, and siblings are
    /// visited in name order. The first error returned by `visit` stops the
    /// traversal and is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error returned by `visit`.
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, &Entry) -> Result<()>,
    {
        self.root.walk(path::ROOT, &mut visit)
    }

    /// Returns the number of entries in the tree, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        // The visitor never fails.
        let _ = self.walk(|_, _| {
            count += 1;
            Ok(())
        });
        count
    }

    /// Returns `true` if the root has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children().next().is_none()
    }
}
