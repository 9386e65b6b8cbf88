//! Post-dump verification
//!
//! Re-reads every snapshot file and checks it against what the writer
//! recorded while dumping.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::dump::DumpStats;
use crate::snapshot::{embedded_length, CollectionSummary, SnapshotReader};

/// Verify every collection listed in `stats`
pub fn verify_snapshot(dir: &Path, stats: &DumpStats) -> Result<()> {
    for expected in &stats.collections {
        verify_collection(dir, expected)?;
    }
    Ok(())
}

/// Check one snapshot file.
///
/// The file must parse as whole frames, every frame must hold a document
/// whose own length prefix matches the frame, and the document count, size
/// and CRC32 must match `expected`.
pub fn verify_collection(dir: &Path, expected: &CollectionSummary) -> Result<()> {
    let path = dir.join(&expected.name);
    let mut reader = SnapshotReader::open(&path)
        .with_context(|| format!("Failed to open snapshot file: {}", path.display()))?;

    while let Some(doc) = reader
        .next_document()
        .with_context(|| format!("Corrupted snapshot file: {}", path.display()))?
    {
        match embedded_length(&doc) {
            Some(len) if len as usize == doc.len() => {}
            Some(len) => bail!(
                "Document {} in '{}' declares {} bytes but its frame holds {}",
                reader.documents_read(),
                expected.name,
                len,
                doc.len()
            ),
            None => bail!(
                "Document {} in '{}' is too short to be BSON ({} bytes)",
                reader.documents_read(),
                expected.name,
                doc.len()
            ),
        }
    }

    if reader.documents_read() != expected.documents {
        bail!(
            "Document count mismatch in '{}': expected {}, found {}",
            expected.name,
            expected.documents,
            reader.documents_read()
        );
    }

    if reader.bytes_read() != expected.bytes {
        bail!(
            "Size mismatch in '{}': expected {} bytes, found {}",
            expected.name,
            expected.bytes,
            reader.bytes_read()
        );
    }

    if reader.checksum() != expected.checksum {
        warn!(
            "Checksum of '{}' is 0x{:08x}, writer recorded 0x{:08x}",
            expected.name,
            reader.checksum(),
            expected.checksum
        );
        bail!("Checksum mismatch in '{}'", expected.name);
    }

    debug!(
        "Verified '{}': {} documents, checksum 0x{:08x}",
        expected.name,
        expected.documents,
        expected.checksum
    );
    Ok(())
}
