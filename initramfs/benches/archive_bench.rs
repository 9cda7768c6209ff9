use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use initramfs::cpio::header::Header;
use initramfs::{path, Archive, ArchiveWriter, CpioWriter, FileSpec, FileTree};
use std::fs;
use std::io;

fn bench_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("path");

    // Benchmark an already clean path
    group.bench_function("canonicalize_clean", |b| {
        b.iter(|| path::canonicalize(black_box("/usr/lib/x86_64-linux-gnu")));
    });

    // Benchmark a path with . and .. components
    group.bench_function("canonicalize_dots", |b| {
        b.iter(|| path::canonicalize(black_box("usr//lib/./../lib64/x/..")));
    });

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");

    for size in &[10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("mkdir_and_add", size), size, |b, &size| {
            b.iter(|| {
                let mut tree = FileTree::new();
                for i in 0..size {
                    let dir = format!("/usr/share/d{}", i % 16);
                    tree.mkdir(&dir).unwrap();
                    tree.add_file(&dir, &format!("f{i}"), "/dev/null").unwrap();
                }
                tree
            });
        });
    }

    let mut tree = FileTree::new();
    tree.mkdir("/usr/lib").unwrap();
    tree.add_link("/", "lib", "usr/lib").unwrap();
    tree.add_link("/", "lib64", "lib").unwrap();

    // Benchmark resolving through chained links
    group.bench_function("resolve_links", |b| {
        b.iter(|| tree.resolve(black_box("/lib64/x86_64-linux-gnu/libc.so.6")));
    });

    group.finish();
}

fn bench_cpio(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpio");

    // Benchmark header encoding only
    group.bench_function("encode_header", |b| {
        let header = Header {
            mode: 0o100_755,
            nlink: 1,
            filesize: 4096,
            ..Header::default()
        };
        b.iter(|| black_box(header).encode(black_box("/lib/libc.so.6"), 0));
    });

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("payload");
    fs::write(&source, vec![0xa5u8; 64 * 1024]).unwrap();

    // Benchmark streaming a file body into a discarding sink
    group.bench_function("write_regular_64k", |b| {
        b.iter(|| {
            let mut writer = CpioWriter::new(io::sink());
            writer.write_regular("/payload", &source, 0o644).unwrap();
            writer.close().unwrap();
        });
    });

    group.finish();
}

fn bench_archive(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let init = dir.path().join("init");
    fs::write(&init, "#!/bin/sh\n").unwrap();

    let mut archive = Archive::new(&init);
    for i in 0..200 {
        let spec = FileSpec::link(format!("/bin/tool{i}"), "/init");
        archive.add_spec(&spec).unwrap();
    }

    c.bench_function("archive_write_cpio", |b| {
        b.iter(|| {
            let mut image = Vec::new();
            archive.write_cpio(&mut image).unwrap();
            image
        });
    });

    c.bench_function("archive_entries", |b| {
        b.iter(|| archive.entries());
    });
}

criterion_group!(benches, bench_path, bench_tree, bench_cpio, bench_archive);
criterion_main!(benches);
