//! Builders for on-disk interval files used by the integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Writes `content` gzip-compressed to `dir/name` and returns the path.
pub fn write_gzip(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create fixture");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(content.as_bytes()).expect("Failed to write fixture");
    encoder.finish().expect("Failed to finish gzip stream");
    path
}

/// Reads a gzip-compressed file to a string.
pub fn read_gzip(path: &Path) -> String {
    let mut text = String::new();
    MultiGzDecoder::new(File::open(path).expect("Failed to open gzip file"))
        .read_to_string(&mut text)
        .expect("Failed to decompress");
    text
}

/// BED3+name text for `(contig, start)` pairs; the name is the input index.
pub fn bed_text(records: &[(&str, i64)]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, (contig, start))| format!("{contig}\t{start}\t{}\tr{i}\n", start + 100))
        .collect()
}

/// A directory with an empty `tmp/` subdirectory for run files.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir(dir.path().join("tmp")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tmp(&self) -> PathBuf {
        self.dir.path().join("tmp")
    }

    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        write_file(self.path(), name, content)
    }
}
