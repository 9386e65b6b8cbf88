//! Snapshot file format definitions
//!
//! A snapshot file holds every document of a single collection as a run of
//! frames:
//!
//! ```text
//! +----------------+----------------------+----------------+-----
//! | len: u32 (LE)  | len bytes of BSON    | len: u32 (LE)  | ...
//! +----------------+----------------------+----------------+-----
//! ```
//!
//! There is no magic, header, footer or document count. The file ends at
//! the end of the last frame.

/// Size of the length prefix in front of every document
pub const FRAME_HEADER_LEN: usize = 4;

/// Encode the little-endian length prefix for a document of `len` bytes
pub fn encode_frame_header(len: usize) -> Result<[u8; FRAME_HEADER_LEN], SnapshotError> {
    let len = u32::try_from(len).map_err(|_| SnapshotError::DocumentTooLarge(len))?;
    Ok(len.to_le_bytes())
}

/// Decode a little-endian length prefix
pub fn decode_frame_header(bytes: [u8; FRAME_HEADER_LEN]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Length a BSON document declares for itself in its first four bytes.
///
/// Returns `None` if the buffer is too short to carry a length.
pub fn embedded_length(doc: &[u8]) -> Option<u32> {
    let prefix: [u8; 4] = doc.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(prefix))
}

/// Snapshot-related errors
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Document of {0} bytes does not fit a u32 length prefix")]
    DocumentTooLarge(usize),

    #[error("Truncated frame header: got {0} of 4 bytes")]
    TruncatedHeader(usize),

    #[error("Truncated document: expected {expected} bytes, got {actual}")]
    TruncatedDocument { expected: u32, actual: usize },
}
