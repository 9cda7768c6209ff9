//! Listing formatter implementations.

use crate::archive::ArchiveEntry;
use crate::error::{Error, Result};
use crate::tree::EntryKind;

use super::ListFormatter;

/// Formatter for human-readable listings.
///
/// Each entry is one line of kind, permission bits, path and, for regular
/// files and links, the source or target:
///
/// ```text
/// directory      /files
/// regular   0755 /files/a.txt <- /etc/a.txt
/// link           /lib64 -> /lib
/// ```
pub struct TextFormatter;

impl ListFormatter for TextFormatter {
    fn format(&self, entries: &[ArchiveEntry]) -> Result<String> {
        let lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                let mode = entry.mode.map(|m| format!("{m:04o}")).unwrap_or_default();
                let mut line = format!("{:<9} {mode:>4} {}", entry.kind.to_string(), entry.path);
                match (&entry.kind, &entry.related_path) {
                    (EntryKind::Regular, Some(source)) => {
                        line.push_str(" <- ");
                        line.push_str(source);
                    }
                    (EntryKind::Link, Some(target)) => {
                        line.push_str(" -> ");
                        line.push_str(target);
                    }
                    _ => {}
                }
                line
            })
            .collect();

        Ok(lines.join("\n"))
    }
}

/// Formatter for JSON output.
pub struct JsonFormatter;

impl ListFormatter for JsonFormatter {
    fn format(&self, entries: &[ArchiveEntry]) -> Result<String> {
        serde_json::to_string_pretty(entries).map_err(|e| Error::Validation {
            field: "json_output".to_string(),
            message: format!("failed to serialize to JSON: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::ListFormat;

    fn sample_entries() -> Vec<ArchiveEntry> {
        vec![
            ArchiveEntry {
                path: "/files".to_string(),
                kind: EntryKind::Directory,
                related_path: None,
                mode: None,
            },
            ArchiveEntry {
                path: "/files/a.txt".to_string(),
                kind: EntryKind::Regular,
                related_path: Some("/etc/a.txt".to_string()),
                mode: Some(0o644),
            },
            ArchiveEntry {
                path: "/lib64".to_string(),
                kind: EntryKind::Link,
                related_path: Some("/lib".to_string()),
                mode: None,
            },
        ]
    }

    #[test]
    fn test_text_formatter() {
        let output = TextFormatter.format(&sample_entries()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "directory      /files");
        assert_eq!(lines[1], "regular   0644 /files/a.txt <- /etc/a.txt");
        assert_eq!(lines[2], "link           /lib64 -> /lib");
    }

    #[test]
    fn test_text_formatter_empty() {
        assert_eq!(TextFormatter.format(&[]).unwrap(), "");
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter.format(&sample_entries()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array[0]["kind"], "directory");
        assert!(array[0].get("related_path").is_none());
        assert_eq!(array[1]["related_path"], "/etc/a.txt");
        assert_eq!(array[1]["mode"], 0o644);
        assert_eq!(array[2]["kind"], "link");
    }

    #[test]
    fn test_list_format_parse() {
        assert_eq!("TEXT".parse::<ListFormat>().unwrap(), ListFormat::Text);
        assert!("yaml".parse::<ListFormat>().is_err());
        assert_eq!(ListFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_create_formatter() {
        let output = ListFormat::Json
            .create_formatter()
            .format(&sample_entries())
            .unwrap();
        assert!(output.starts_with('['));
    }
}
