//! Zip archive fixtures.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds an in-memory archive entry by entry, in insertion order.
///
/// Entries are stored uncompressed so tests can locate and flip content bytes, unless added
/// through [`ZipFixture::deflated_file`].
pub struct ZipFixture {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipFixture {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options() -> FileOptions {
        FileOptions::default().compression_method(CompressionMethod::Stored)
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.writer
            .add_directory(path, Self::options())
            .expect("add directory entry");
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.writer
            .start_file(path, Self::options())
            .expect("start file entry");
        self.writer.write_all(content).expect("write file entry");
        self
    }

    pub fn deflated_file(mut self, path: &str, content: &[u8]) -> Self {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(path, options)
            .expect("start deflated entry");
        self.writer.write_all(content).expect("write deflated entry");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.writer.finish().expect("finish archive").into_inner()
    }
}

impl Default for ZipFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Archive with one stored file entry per `(path, content)` pair.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    entries
        .iter()
        .fold(ZipFixture::new(), |zip, (path, content)| zip.file(path, content))
        .build()
}

/// Overwrite the uncompressed size recorded for the first entry in the central directory.
pub fn patch_declared_size(mut bytes: Vec<u8>, size: u32) -> Vec<u8> {
    let header = bytes
        .windows(4)
        .position(|w| w == b"PK\x01\x02")
        .expect("central directory header");
    bytes[header + 24..header + 28].copy_from_slice(&size.to_le_bytes());
    bytes
}
