//! Common test utilities for integration tests.
//!
//! This module provides ELF fixtures, a reader for "newc" CPIO archives and
//! helpers for laying out fake library directories.

use std::fs;
use std::path::{Path, PathBuf};

/// Creates a temporary directory for testing.
#[allow(dead_code)]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Builds a minimal 64-bit little-endian ELF shared object.
///
/// The file has no program headers and three sections: the null section,
/// `.dynstr` and `.dynamic` with one `DT_NEEDED` entry per library name.
/// With no names the dynamic section only holds `DT_NULL`.
pub fn elf_with_needed(needed: &[&str]) -> Vec<u8> {
    const EHDR_LEN: usize = 64;
    const SHDR_LEN: usize = 64;

    let mut dynstr = vec![0u8];
    let mut offsets = Vec::new();
    for name in needed {
        offsets.push(dynstr.len() as u64);
        dynstr.extend_from_slice(name.as_bytes());
        dynstr.push(0);
    }

    let mut dynamic = Vec::new();
    for offset in &offsets {
        dynamic.extend_from_slice(&1i64.to_le_bytes()); // DT_NEEDED
        dynamic.extend_from_slice(&offset.to_le_bytes());
    }
    dynamic.extend_from_slice(&0i64.to_le_bytes()); // DT_NULL
    dynamic.extend_from_slice(&0u64.to_le_bytes());

    let dynstr_off = EHDR_LEN;
    let dynamic_off = align8(dynstr_off + dynstr.len());
    let shoff = align8(dynamic_off + dynamic.len());

    let mut buf = elf_header(shoff as u64, 3);
    buf.extend_from_slice(&dynstr);
    buf.resize(dynamic_off, 0);
    buf.extend_from_slice(&dynamic);
    buf.resize(shoff, 0);

    buf.extend_from_slice(&[0u8; SHDR_LEN]);
    buf.extend_from_slice(&section_header(
        3, // SHT_STRTAB
        dynstr_off as u64,
        dynstr.len() as u64,
        0,
        1,
        0,
    ));
    buf.extend_from_slice(&section_header(
        6, // SHT_DYNAMIC
        dynamic_off as u64,
        dynamic.len() as u64,
        1,
        8,
        16,
    ));
    buf
}

/// Builds a minimal 64-bit ELF file without any sections, like a static
/// executable.
#[allow(dead_code)]
pub fn static_elf() -> Vec<u8> {
    elf_header(0, 0)
}

fn elf_header(shoff: u64, shnum: u16) -> Vec<u8> {
    let mut h = Vec::with_capacity(64);
    h.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    h.extend_from_slice(&[0u8; 8]);
    h.extend_from_slice(&3u16.to_le_bytes()); // ET_DYN
    h.extend_from_slice(&62u16.to_le_bytes()); // EM_X86_64
    h.extend_from_slice(&1u32.to_le_bytes()); // EV_CURRENT
    h.extend_from_slice(&0u64.to_le_bytes()); // e_entry
    h.extend_from_slice(&0u64.to_le_bytes()); // e_phoff
    h.extend_from_slice(&shoff.to_le_bytes());
    h.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    h.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
    h.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
    h.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
    h.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
    h.extend_from_slice(&shnum.to_le_bytes());
    h.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
    h
}

fn section_header(
    sh_type: u32,
    offset: u64,
    size: u64,
    link: u32,
    align: u64,
    entsize: u64,
) -> Vec<u8> {
    let mut s = Vec::with_capacity(64);
    s.extend_from_slice(&0u32.to_le_bytes()); // sh_name
    s.extend_from_slice(&sh_type.to_le_bytes());
    s.extend_from_slice(&0u64.to_le_bytes()); // sh_flags
    s.extend_from_slice(&0u64.to_le_bytes()); // sh_addr
    s.extend_from_slice(&offset.to_le_bytes());
    s.extend_from_slice(&size.to_le_bytes());
    s.extend_from_slice(&link.to_le_bytes());
    s.extend_from_slice(&0u32.to_le_bytes()); // sh_info
    s.extend_from_slice(&align.to_le_bytes());
    s.extend_from_slice(&entsize.to_le_bytes());
    s
}

fn align8(n: usize) -> usize {
    (n + 7) & !7
}

/// Writes an ELF fixture needing `needed` to `dir/name` and returns its path.
pub fn write_elf(dir: &Path, name: &str, needed: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, elf_with_needed(needed)).unwrap();
    path
}

/// One decoded archive record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Record {
    pub name: String,
    pub ino: u32,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u32,
    pub mtime: u32,
    pub data: Vec<u8>,
}

#[allow(dead_code)]
impl Record {
    pub fn is_dir(&self) -> bool {
        self.mode & 0o170_000 == 0o040_000
    }

    pub fn is_link(&self) -> bool {
        self.mode & 0o170_000 == 0o120_000
    }

    pub fn is_regular(&self) -> bool {
        self.mode & 0o170_000 == 0o100_000
    }

    pub fn perm(&self) -> u32 {
        self.mode & 0o7777
    }
}

/// Decodes a "newc" archive, checking magic, alignment and the trailer.
///
/// The trailer record is not returned.
pub fn read_newc(bytes: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut off = 0usize;

    loop {
        assert!(off + 110 <= bytes.len(), "truncated header at {off}");
        assert_eq!(&bytes[off..off + 6], b"070701", "bad magic at {off}");
        let field = |i: usize| {
            let start = off + 6 + i * 8;
            let text = std::str::from_utf8(&bytes[start..start + 8]).unwrap();
            u32::from_str_radix(text, 16).unwrap()
        };

        let ino = field(0);
        let mode = field(1);
        let uid = field(2);
        let gid = field(3);
        let nlink = field(4);
        let mtime = field(5);
        let filesize = field(6) as usize;
        let namesize = field(11) as usize;

        let name_start = off + 110;
        let name_end = name_start + namesize - 1;
        assert_eq!(bytes[name_end], 0, "name not NUL-terminated");
        let name = std::str::from_utf8(&bytes[name_start..name_end])
            .unwrap()
            .to_string();

        let data_start = (name_start + namesize + 3) & !3;
        let data_end = data_start + filesize;
        let data = bytes[data_start..data_end].to_vec();
        off = (data_end + 3) & !3;

        if name == "TRAILER!!!" {
            assert_eq!(off, bytes.len(), "data after trailer");
            break;
        }

        records.push(Record {
            name,
            ino,
            mode,
            uid,
            gid,
            nlink,
            mtime,
            data,
        });
    }

    records
}

/// Returns the names of `records` in archive order.
#[allow(dead_code)]
pub fn names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

/// Finds the record named `name`.
#[allow(dead_code)]
pub fn find<'a>(records: &'a [Record], name: &str) -> &'a Record {
    records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("{name} not in archive: {:?}", names(records)))
}
