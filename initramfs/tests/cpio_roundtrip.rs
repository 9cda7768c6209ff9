//! Integration tests for the "newc" CPIO writer.
//!
//! Archives are written with `CpioWriter` and decoded again with the reader
//! in `common`, which checks magic, alignment and trailer placement. One
//! test decodes with the `cpio` crate so the layout is checked against a
//! reader that shares no code with the writer.

mod common;

use std::fs;
use std::io::{Cursor, Read, Write};

use common::{names, read_newc};
use initramfs::{ArchiveWriter, CpioWriter, Error, FileSpec};

#[test]
fn test_body_sizes_cover_all_paddings() {
    let dir = common::create_temp_dir();
    let mut writer = CpioWriter::new(Vec::new());

    for len in 0..8usize {
        let source = dir.path().join(format!("f{len}"));
        fs::write(&source, vec![b'x'; len]).unwrap();
        writer
            .write_regular(&format!("/f{len}"), &source, 0o600)
            .unwrap();
    }
    writer.close().unwrap();

    let bytes = writer.into_inner();
    let records = read_newc(&bytes);
    assert_eq!(records.len(), 8);
    for (len, record) in records.iter().enumerate() {
        assert_eq!(record.data.len(), len);
        assert_eq!(record.perm(), 0o600);
    }
}

#[test]
fn test_name_lengths_cover_all_paddings() {
    let mut writer = CpioWriter::new(Vec::new());
    let names_in = ["/a", "/ab", "/abc", "/abcd", "/abcde"];
    for name in names_in {
        writer.write_directory(name).unwrap();
    }
    writer.close().unwrap();

    let records = read_newc(&writer.into_inner());
    assert_eq!(names(&records), names_in);
    assert!(records.iter().all(|r| r.is_dir() && r.nlink == 2));
}

#[test]
fn test_sequential_inodes() {
    let mut writer = CpioWriter::new(Vec::new());
    writer.write_directory("/dev").unwrap();
    writer.write_link("/sbin", "/bin").unwrap();
    writer.write_directory("/bin").unwrap();
    writer.close().unwrap();

    let records = read_newc(&writer.into_inner());
    let inodes: Vec<u32> = records.iter().map(|r| r.ino).collect();
    assert_eq!(inodes, vec![1, 2, 3]);
}

#[test]
fn test_link_body_is_target() {
    let mut writer = CpioWriter::new(Vec::new());
    writer
        .write_link("/lib/libc.so", "libc.so.6")
        .unwrap();
    writer.close().unwrap();

    let records = read_newc(&writer.into_inner());
    assert!(records[0].is_link());
    assert_eq!(records[0].data, b"libc.so.6");
}

#[test]
fn test_empty_archive_is_only_trailer() {
    let mut writer = CpioWriter::new(Vec::new());
    writer.close().unwrap();
    writer.close().unwrap();

    let bytes = writer.into_inner();
    assert!(read_newc(&bytes).is_empty());
    assert_eq!(bytes.len(), 124);
}

#[test]
fn test_write_after_close_fails() {
    let mut writer = CpioWriter::new(Vec::new());
    writer.close().unwrap();

    let err = writer.write_directory("/late").unwrap_err();
    assert!(matches!(err, Error::ArchiveClosed));
}

#[test]
fn test_directory_source_rejected() {
    let dir = common::create_temp_dir();
    let mut writer = CpioWriter::new(Vec::new());

    let err = writer.write_regular("/etc", dir.path(), 0).unwrap_err();
    assert!(matches!(err, Error::NotRegularFile { .. }));
    // Nothing was written for the rejected entry.
    assert_eq!(writer.offset(), 0);
}

#[test]
fn test_file_spec_write_to_without_parents() {
    let mut source = tempfile::NamedTempFile::new().unwrap();
    source.write_all(b"data").unwrap();

    let mut writer = CpioWriter::new(Vec::new());
    FileSpec::regular("etc/conf", source.path().to_string_lossy())
        .with_mode(0o640)
        .write_to(&mut writer)
        .unwrap();
    FileSpec::directory("/run").write_to(&mut writer).unwrap();
    writer.close().unwrap();

    let records = read_newc(&writer.into_inner());
    assert_eq!(names(&records), vec!["/etc/conf", "/run"]);
    assert_eq!(records[0].perm(), 0o640);
    assert_eq!(records[0].data, b"data");
}

#[test]
fn test_archive_readable_by_cpio_crate() {
    let dir = common::create_temp_dir();
    let mut writer = CpioWriter::new(Vec::new());
    let mut expected = Vec::new();

    writer.write_directory("/etc").unwrap();
    expected.push(("/etc".to_string(), 0o040_777, Vec::new()));
    for len in 0..5usize {
        let name = format!("/etc/{}", "n".repeat(len + 1));
        let source = dir.path().join(format!("src{len}"));
        let body: Vec<u8> = (0..len as u8).map(|b| b'a' + b).collect();
        fs::write(&source, &body).unwrap();
        writer.write_regular(&name, &source, 0o640).unwrap();
        expected.push((name, 0o100_640, body));
    }
    writer.write_link("/etc/mtab", "/proc/self/mounts").unwrap();
    expected.push((
        "/etc/mtab".to_string(),
        0o120_777,
        b"/proc/self/mounts".to_vec(),
    ));
    writer.close().unwrap();

    let bytes = writer.into_inner();
    let mut cursor = Cursor::new(bytes.as_slice());
    let mut decoded = Vec::new();
    loop {
        let mut reader = cpio::NewcReader::new(cursor).unwrap();
        if reader.entry().is_trailer() {
            cursor = reader.finish().unwrap();
            break;
        }
        let name = reader.entry().name().to_string();
        let mode = reader.entry().mode();
        let mut body = Vec::new();
        reader.read_to_end(&mut body).unwrap();
        assert_eq!(reader.entry().file_size() as usize, body.len());
        decoded.push((name, mode, body));
        cursor = reader.finish().unwrap();
    }

    assert_eq!(decoded, expected);
    assert_eq!(cursor.position() as usize, bytes.len());
}
