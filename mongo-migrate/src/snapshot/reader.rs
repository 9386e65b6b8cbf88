//! Snapshot reader implementation

use super::{decode_frame_header, SnapshotError, FRAME_HEADER_LEN};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// Reads documents back out of a snapshot file
pub struct SnapshotReader<R = BufReader<File>> {
    /// Buffered source
    reader: R,
    /// Running checksum hasher
    hasher: crc32fast::Hasher,
    /// Number of documents read
    documents: u64,
    /// Number of bytes read
    bytes_read: u64,
}

impl SnapshotReader {
    /// Open a snapshot file for reading
    pub fn open(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> SnapshotReader<R> {
    /// Wrap any byte source holding snapshot frames
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            hasher: crc32fast::Hasher::new(),
            documents: 0,
            bytes_read: 0,
        }
    }

    /// Read the next document.
    ///
    /// Returns `Ok(None)` at a clean end of file. End of file in the middle
    /// of a frame is an error.
    pub fn next_document(&mut self) -> Result<Option<Vec<u8>>, SnapshotError> {
        let mut len_bytes = [0u8; FRAME_HEADER_LEN];
        match self.read_bytes(&mut len_bytes)? {
            0 => return Ok(None),
            FRAME_HEADER_LEN => {}
            n => return Err(SnapshotError::TruncatedHeader(n)),
        }
        let len = decode_frame_header(len_bytes);

        // Grows only with the bytes actually present, not the prefix.
        let mut doc = Vec::new();
        let n = (&mut self.reader).take(u64::from(len)).read_to_end(&mut doc)?;
        self.hasher.update(&doc);
        self.bytes_read += n as u64;
        if n != len as usize {
            return Err(SnapshotError::TruncatedDocument {
                expected: len,
                actual: n,
            });
        }

        self.documents += 1;
        Ok(Some(doc))
    }

    /// Number of documents read so far
    pub fn documents_read(&self) -> u64 {
        self.documents
    }

    /// Number of bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// CRC32 of every byte consumed so far
    pub fn checksum(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Fill `buf` as far as the source allows and update checksum.
    ///
    /// Returns the number of bytes read, short only at end of file.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, SnapshotError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.hasher.update(&buf[..filled]);
        self.bytes_read += filled as u64;
        Ok(filled)
    }
}

impl<R: Read> Iterator for SnapshotReader<R> {
    type Item = Result<Vec<u8>, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_document().transpose()
    }
}

/// Read every document of a snapshot file
pub fn read_snapshot_file(path: &Path) -> Result<Vec<Vec<u8>>, SnapshotError> {
    SnapshotReader::open(path)?.collect()
}
