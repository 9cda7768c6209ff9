//! Output formatting for archive listings.
//!
//! This module renders the planned content of an archive, as returned by
//! [`Archive::entries`](crate::Archive::entries), as human-readable text or
//! JSON.

mod formatters;

use std::fmt;
use std::str::FromStr;

use crate::archive::ArchiveEntry;
use crate::error::{Error, Result};

pub use formatters::{JsonFormatter, TextFormatter};

/// Trait for formatting archive listings into different output formats.
pub trait ListFormatter {
    /// Format the given entries into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the formatting fails.
    fn format(&self, entries: &[ArchiveEntry]) -> Result<String>;
}

/// Available output formats for listings.
///
/// # Examples
///
/// ```
/// use initramfs::output::ListFormat;
///
/// assert_eq!("json".parse::<ListFormat>().unwrap(), ListFormat::Json);
/// assert_eq!(ListFormat::default(), ListFormat::Text);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    /// One line per entry.
    #[default]
    Text,
    /// A JSON array of entries.
    Json,
}

impl ListFormat {
    /// Create a formatter for this output format.
    #[must_use]
    pub fn create_formatter(&self) -> Box<dyn ListFormatter> {
        match self {
            Self::Text => Box::new(TextFormatter),
            Self::Json => Box::new(JsonFormatter),
        }
    }
}

impl fmt::Display for ListFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ListFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(Error::Validation {
                field: "format".to_string(),
                message: format!("unknown list format '{s}' (expected text or json)"),
            }),
        }
    }
}
