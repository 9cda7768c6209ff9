//! Archive path handling.
//!
//! Paths inside an archive are plain strings that always use `/` as the
//! separator, independent of the host platform, and are always absolute.
//! Functions in this module are purely lexical: they never touch the real
//! filesystem.

use std::path::Path;

use crate::error::{Error, Result};

/// The separator used in archive paths.
pub const SEPARATOR: char = '/';

/// The archive root.
pub const ROOT: &str = "/";

/// Returns `true` if the path denotes the archive root.
///
/// # Examples
///
/// ```
/// use initramfs::path::is_root;
///
/// assert!(is_root(""));
/// assert!(is_root("."));
/// assert!(is_root("/"));
/// assert!(is_root("//./"));
/// assert!(!is_root("/lib"));
/// ```
#[must_use]
pub fn is_root(path: &str) -> bool {
    canonicalize(path) == ROOT
}

/// Canonicalize an archive path.
///
/// The result is absolute, has no repeated or trailing separators and no
/// `.` or `..` segments. `..` at the root stays at the root. Relative input
/// is interpreted relative to the root.
///
/// # Examples
///
/// ```
/// use initramfs::path::canonicalize;
///
/// assert_eq!(canonicalize("lib"), "/lib");
/// assert_eq!(canonicalize("/usr//lib/"), "/usr/lib");
/// assert_eq!(canonicalize("/usr/./lib/../lib64"), "/usr/lib64");
/// assert_eq!(canonicalize("/.."), "/");
/// ```
#[must_use]
pub fn canonicalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    let mut result = String::with_capacity(path.len() + 1);
    for segment in &segments {
        result.push(SEPARATOR);
        result.push_str(segment);
    }
    if result.is_empty() {
        result.push(SEPARATOR);
    }
    result
}

/// Returns the segments of the canonical form of `path`.
///
/// The root has no segments.
///
/// # Examples
///
/// ```
/// use initramfs::path::segments;
///
/// assert_eq!(segments("/usr/lib"), vec!["usr", "lib"]);
/// assert!(segments("/").is_empty());
/// ```
#[must_use]
pub fn segments(path: &str) -> Vec<String> {
    canonicalize(path)
        .split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Split a path into its canonical parent directory and final name.
///
/// The root splits into `("/", "")`.
///
/// # Examples
///
/// ```
/// use initramfs::path::split;
///
/// assert_eq!(split("/usr/lib"), ("/usr".to_string(), "lib".to_string()));
/// assert_eq!(split("lib"), ("/".to_string(), "lib".to_string()));
/// ```
#[must_use]
pub fn split(path: &str) -> (String, String) {
    let canonical = canonicalize(path);
    match canonical.rsplit_once(SEPARATOR) {
        Some(("", name)) => (ROOT.to_string(), name.to_string()),
        Some((parent, name)) => (parent.to_string(), name.to_string()),
        None => (ROOT.to_string(), String::new()),
    }
}

/// Join a name onto an archive directory path.
///
/// # Examples
///
/// ```
/// use initramfs::path::join;
///
/// assert_eq!(join("/", "init"), "/init");
/// assert_eq!(join("/files", "a.txt"), "/files/a.txt");
/// ```
#[must_use]
pub fn join(base: &str, name: &str) -> String {
    canonicalize(&format!("{base}{SEPARATOR}{name}"))
}

/// Validate a single entry name.
///
/// A name must be non-empty, must not be `.` or `..`, and must not contain
/// a separator or a NUL byte (the CPIO name field is NUL-terminated).
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the name is rejected.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." || name == ".." {
        "name is a relative directory reference"
    } else if name.contains(SEPARATOR) {
        "name contains a path separator"
    } else if name.contains('\0') {
        "name contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Returns the final component of a host path as an archive entry name.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] if the path has no final component
/// (such as `/` or `..`) or the component is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use initramfs::path::base_name;
/// use std::path::Path;
///
/// assert_eq!(base_name(Path::new("dir/b.txt")).unwrap(), "b.txt");
/// assert!(base_name(Path::new("/")).is_err());
/// ```
pub fn base_name(path: &Path) -> Result<String> {
    let name = path.file_name().ok_or_else(|| Error::InvalidPath {
        path: path.to_path_buf(),
        reason: "path has no file name".to_string(),
    })?;

    name.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "file name contains invalid UTF-8".to_string(),
        })
}
