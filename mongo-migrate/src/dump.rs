//! Dump every collection of a database into a snapshot directory

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::SnapshotConfig;
use crate::snapshot::{CollectionSummary, SnapshotWriter};
use crate::source::{DocumentCursor, DocumentSource};
use crate::verify::verify_snapshot;

/// Outcome of a dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per collection, in dump order
    pub collections: Vec<CollectionSummary>,
}

impl DumpStats {
    pub fn total_documents(&self) -> u64 {
        self.collections.iter().map(|c| c.documents).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.collections.iter().map(|c| c.bytes).sum()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Make sure the snapshot directory exists.
///
/// An existing directory is used as is. A missing one is created, along
/// with any missing parents, readable by the owner only.
pub fn prepare_snapshot_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        debug!("Reusing snapshot directory: {}", path.display());
        return Ok(());
    }

    create_private_dir(path)
        .with_context(|| format!("Failed to create snapshot directory: {}", path.display()))?;

    info!("Created snapshot directory: {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

/// Dump every collection of `source` into `dir`, one file per collection.
///
/// Collections are processed one at a time in the order the source lists
/// them. The first error stops the dump and leaves whatever was written so
/// far on disk.
pub async fn dump_database<S: DocumentSource>(source: &S, dir: &Path) -> Result<DumpStats> {
    let started_at = Utc::now();

    let names = source.collection_names().await?;
    info!("Dumping {} collections to {}", names.len(), dir.display());

    let mut collections = Vec::with_capacity(names.len());
    for name in &names {
        let summary = dump_collection(source, dir, name).await?;
        info!(
            "Dumped collection '{}': {} documents, {} bytes",
            summary.name, summary.documents, summary.bytes
        );
        collections.push(summary);
    }

    Ok(DumpStats {
        started_at,
        finished_at: Utc::now(),
        collections,
    })
}

/// Dump one collection into `dir/<name>`
pub async fn dump_collection<S: DocumentSource>(
    source: &S,
    dir: &Path,
    name: &str,
) -> Result<CollectionSummary> {
    let mut writer = SnapshotWriter::for_collection(dir, name)
        .with_context(|| format!("Failed to create snapshot file for '{}'", name))?;

    let mut cursor = source.find_all(name).await?;
    while cursor.advance().await? {
        writer
            .write_document(cursor.current())
            .with_context(|| format!("Failed to write {}", writer.path().display()))?;

        if writer.documents_written() % 10_000 == 0 {
            debug!("'{}': {} documents written", name, writer.documents_written());
        }
    }

    writer
        .finish()
        .with_context(|| format!("Failed to finish snapshot file for '{}'", name))
}

/// Runs a full dump described by a [`SnapshotConfig`]
pub struct SnapshotEngine<S> {
    config: SnapshotConfig,
    source: S,
}

impl<S: DocumentSource> SnapshotEngine<S> {
    pub fn new(config: SnapshotConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Prepare the directory, dump, then verify and report if asked to
    pub async fn run(&self) -> Result<DumpStats> {
        let dir = &self.config.snapshot_dir;

        prepare_snapshot_dir(dir)?;

        let stats = dump_database(&self.source, dir)
            .await
            .context("Snapshot dump failed")?;

        info!(
            "Dump complete: {} collections, {} documents, {} bytes in {}ms",
            stats.collections.len(),
            stats.total_documents(),
            stats.total_bytes(),
            stats.duration().num_milliseconds()
        );

        if self.config.verify {
            info!("Verifying snapshot...");
            verify_snapshot(dir, &stats).context("Snapshot verification failed")?;
            info!("Snapshot verification passed");
        }

        if let Some(report) = &self.config.report {
            write_report(report, &stats)?;
            info!("Wrote report to {}", report.display());
        }

        Ok(stats)
    }

    /// Give the source back, e.g. to shut down its client
    pub fn into_source(self) -> S {
        self.source
    }
}

/// Write `stats` as pretty-printed JSON
pub fn write_report(path: &Path, stats: &DumpStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}
