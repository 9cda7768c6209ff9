//! In-memory model of the archive namespace.
//!
//! The tree holds regular files, directories and symbolic links by their
//! archive path, independent of the real filesystem. Regular files only
//! record where their content lives on the host; nothing is read until the
//! archive is written.
//!
//! # Examples
//!
//! ```
//! use initramfs::tree::{EntryKind, FileTree};
//!
//! let mut tree = FileTree::new();
//! tree.root_mut().add_file("init", "/bin/busybox").unwrap();
//! tree.mkdir("/lib").unwrap();
//! tree.mkdir("/lib").unwrap(); // directories are idempotent
//! assert!(tree.root_mut().add_file("init", "/bin/sh").is_err());
//!
//! let mut kinds = Vec::new();
//! tree.walk(|path, entry| {
//!     kinds.push((path.to_string(), entry.kind()));
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         ("/init".to_string(), EntryKind::Regular),
//!         ("/lib".to_string(), EntryKind::Directory),
//!     ]
//! );
//! ```

mod entry;
mod file_tree;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use entry::{Entry, EntryKind};
pub use file_tree::{FileTree, MAX_LINK_HOPS};
