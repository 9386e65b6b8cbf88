//! Inspect a snapshot directory
//!
//! Reads every snapshot file in a directory and prints how many documents
//! and bytes each one holds.
//!
//! ```text
//! cargo run --example inspect_snapshot -- /var/snapshot
//! ```

use anyhow::{Context, Result};
use mongo_migrate::SnapshotReader;
use std::path::PathBuf;

fn main() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: inspect_snapshot <SNAPSHOT_DIR>")?;

    let mut entries: Vec<_> = std::fs::read_dir(&dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    println!("{:<30} {:>10} {:>12} {:>10}", "COLLECTION", "DOCUMENTS", "BYTES", "CRC32");
    println!("{}", "-".repeat(65));

    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let mut reader = SnapshotReader::open(&path)?;
        while reader
            .next_document()
            .with_context(|| format!("Corrupted snapshot file: {}", path.display()))?
            .is_some()
        {}

        println!(
            "{:<30} {:>10} {:>12} {:>10}",
            entry.file_name().to_string_lossy(),
            reader.documents_read(),
            reader.bytes_read(),
            format!("{:08x}", reader.checksum())
        );
    }

    Ok(())
}
