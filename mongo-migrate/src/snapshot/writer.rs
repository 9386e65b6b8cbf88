//! Snapshot writer implementation

use super::{encode_frame_header, SnapshotError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What was written for one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Collection name (also the snapshot file name)
    pub name: String,
    /// Number of documents written
    pub documents: u64,
    /// Total file size in bytes, length prefixes included
    pub bytes: u64,
    /// CRC32 over every byte of the file
    pub checksum: u32,
}

/// Writes the documents of one collection to a snapshot file
pub struct SnapshotWriter {
    /// Collection name reported in the summary
    name: String,
    /// Buffered file writer
    writer: BufWriter<File>,
    /// Path to snapshot file
    path: PathBuf,
    /// Running checksum hasher
    hasher: crc32fast::Hasher,
    /// Number of documents written
    documents: u64,
    /// Number of bytes written
    bytes_written: u64,
}

impl SnapshotWriter {
    /// Create the snapshot file, truncating any previous contents.
    ///
    /// The parent directory must already exist.
    pub fn create(path: &Path) -> Result<Self, SnapshotError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::create_named(path, name)
    }

    /// Create the snapshot file for `collection` inside `dir`.
    ///
    /// The collection name is joined to `dir` verbatim. A name containing a
    /// path separator is not confined to `dir`.
    pub fn for_collection(dir: &Path, collection: &str) -> Result<Self, SnapshotError> {
        Self::create_named(&dir.join(collection), collection.to_string())
    }

    fn create_named(path: &Path, name: String) -> Result<Self, SnapshotError> {
        let file = File::create(path)?;

        Ok(Self {
            name,
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            hasher: crc32fast::Hasher::new(),
            documents: 0,
            bytes_written: 0,
        })
    }

    /// Append one document as a length-prefixed frame.
    ///
    /// The bytes are written exactly as given.
    pub fn write_document(&mut self, doc: &[u8]) -> Result<(), SnapshotError> {
        let header = encode_frame_header(doc.len())?;
        self.write_bytes(&header)?;
        self.write_bytes(doc)?;
        self.documents += 1;
        Ok(())
    }

    /// Flush the file and report what was written
    pub fn finish(mut self) -> Result<CollectionSummary, SnapshotError> {
        self.writer.flush()?;

        Ok(CollectionSummary {
            name: self.name,
            documents: self.documents,
            bytes: self.bytes_written,
            checksum: self.hasher.finalize(),
        })
    }

    /// Write bytes and update checksum
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Number of documents written so far
    pub fn documents_written(&self) -> u64 {
        self.documents
    }

    /// Get the number of bytes written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }
}
