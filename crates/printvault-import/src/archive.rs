//! In-memory zip archive reader.
//!
//! Opening parses the central directory; enumeration reads entry metadata only, and content
//! is decompressed on demand through [`ArchiveReader::read_content`], which verifies the CRC-32
//! of every entry it materializes.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::ArchiveError;

/// Declared sizes are untrusted until the content has been read.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Metadata of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the central directory
    pub index: usize,
    /// Full slash-separated path inside the archive
    pub path: String,
    pub is_directory: bool,
    /// Declared uncompressed size
    pub size: u64,
}

/// Reader over one archive held in memory.
///
/// Owns its decompression state exclusively; enumeration is finite and can only be restarted
/// by opening the bytes again.
pub struct ArchiveReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    cursor: usize,
}

impl<'a> ArchiveReader<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self { archive, cursor: 0 })
    }

    /// Number of entries declared by the central directory, directories included.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Next entry in archive order, without decompressing it.
    pub fn next_entry(&mut self) -> Option<Result<ArchiveEntry, ArchiveError>> {
        if self.cursor >= self.archive.len() {
            return None;
        }
        let index = self.cursor;
        self.cursor += 1;

        let file = match self.archive.by_index_raw(index) {
            Ok(file) => file,
            Err(e) => return Some(Err(e.into())),
        };

        Some(Ok(ArchiveEntry {
            index,
            path: normalize_path(file.name()),
            is_directory: file.is_dir(),
            size: file.size(),
        }))
    }

    /// Decompress one entry and verify its checksum and length.
    pub fn read_content(&mut self, entry: &ArchiveEntry) -> Result<Vec<u8>, ArchiveError> {
        let mut file = self.archive.by_index(entry.index)?;

        let capacity = usize::try_from(entry.size.min(MAX_PREALLOCATION)).unwrap_or(0);
        let mut content = Vec::with_capacity(capacity);
        // One byte past the declared size is enough to detect a lying header without
        // inflating the rest. The reader checks the CRC-32 once it reaches the end of the data.
        (&mut file)
            .take(entry.size.saturating_add(1))
            .read_to_end(&mut content).map_err(|e| {
            ArchiveError::Corrupt(format!("Failed to decompress {}: {}", entry.path, e))
        })?;

        if content.len() as u64 != entry.size {
            return Err(ArchiveError::Corrupt(format!(
                "Entry {} is {} bytes, expected {}",
                entry.path,
                content.len(),
                entry.size
            )));
        }

        Ok(content)
    }
}

/// Archives written on Windows sometimes use backslash separators.
fn normalize_path(name: &str) -> String {
    name.replace('\\', "/")
}
