//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers isolated from the caller's environment
//! - Test data fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables read by mkinitramfs.
const ENV_VARS: [&str; 4] = [
    "INITRAMFS_CONFIG",
    "INITRAMFS_SEARCH_PATH",
    "INITRAMFS_RESOLVE_LIBS",
    "INITRAMFS_LOG_MODE",
];

/// Test environment with an isolated temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Canonical path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp dir");

        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a command builder with all `INITRAMFS_*` variables removed.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("mkinitramfs").expect("Failed to find mkinitramfs binary");
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(&self.temp_path);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Create a subdirectory in the test environment.
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::create_dir_all(&path).expect("Failed to create test directory");
        path
    }

    /// Create a file with `content` in the test environment.
    pub fn create_file(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Create a shell script usable as init.
    pub fn create_init(&self) -> PathBuf {
        self.create_file("init.sh", "#!/bin/sh\nexec /bin/sh\n")
    }

    /// Create an ELF fixture named `name` that links against `needed`.
    pub fn create_elf(&self, name: &str, needed: &[&str]) -> PathBuf {
        self.create_file(name, elf_with_needed(needed))
    }
}

/// Builds a minimal 64-bit little-endian ELF file with one `DT_NEEDED`
/// entry per name.
fn elf_with_needed(needed: &[&str]) -> Vec<u8> {
    let mut dynstr = vec![0u8];
    let mut dynamic = Vec::new();
    for name in needed {
        dynamic.extend_from_slice(&1u64.to_le_bytes());
        dynamic.extend_from_slice(&(dynstr.len() as u64).to_le_bytes());
        dynstr.extend_from_slice(name.as_bytes());
        dynstr.push(0);
    }
    dynamic.extend_from_slice(&[0u8; 16]);

    let dynstr_off = 64usize;
    let dynamic_off = (dynstr_off + dynstr.len() + 7) & !7;
    let shoff = (dynamic_off + dynamic.len() + 7) & !7;

    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    buf.extend_from_slice(&3u16.to_le_bytes());
    buf.extend_from_slice(&62u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&(shoff as u64).to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    for half in [64u16, 56, 0, 64, 3, 0] {
        buf.extend_from_slice(&half.to_le_bytes());
    }

    buf.extend_from_slice(&dynstr);
    buf.resize(dynamic_off, 0);
    buf.extend_from_slice(&dynamic);
    buf.resize(shoff, 0);

    buf.extend_from_slice(&[0u8; 64]);
    for (sh_type, offset, size, link, align, entsize) in [
        (3u32, dynstr_off, dynstr.len(), 0u32, 1u64, 0u64),
        (6u32, dynamic_off, dynamic.len(), 1u32, 8u64, 16u64),
    ] {
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&sh_type.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&(offset as u64).to_le_bytes());
        buf.extend_from_slice(&(size as u64).to_le_bytes());
        buf.extend_from_slice(&link.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&align.to_le_bytes());
        buf.extend_from_slice(&entsize.to_le_bytes());
    }
    buf
}

/// Returns the entry names of a "newc" archive, without the trailer.
#[allow(dead_code)]
pub fn archive_names(bytes: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut off = 0usize;
    while off + 110 <= bytes.len() {
        assert_eq!(&bytes[off..off + 6], b"070701");
        let field = |i: usize| {
            let text = std::str::from_utf8(&bytes[off + 6 + i * 8..off + 14 + i * 8]).unwrap();
            usize::from_str_radix(text, 16).unwrap()
        };
        let filesize = field(6);
        let namesize = field(11);
        let name_start = off + 110;
        let name = String::from_utf8(bytes[name_start..name_start + namesize - 1].to_vec()).unwrap();
        let data_start = (name_start + namesize + 3) & !3;
        off = (data_start + filesize + 3) & !3;
        if name == "TRAILER!!!" {
            break;
        }
        names.push(name);
    }
    names
}
