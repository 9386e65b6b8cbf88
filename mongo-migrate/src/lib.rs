//! Mongo snapshot migration library
//!
//! Dumps the collections of the app's MongoDB database to a directory of
//! per-collection snapshot files, and lists collection names.

pub mod cli;
pub mod config;
pub mod dump;
pub mod list;
pub mod snapshot;
pub mod source;
pub mod verify;

pub use config::{MongoConfig, SnapshotConfig};
pub use dump::{dump_database, prepare_snapshot_dir, DumpStats, SnapshotEngine};
pub use list::list_collections;
pub use snapshot::{CollectionSummary, SnapshotError, SnapshotReader, SnapshotWriter};
pub use source::{DocumentCursor, DocumentSource, MemorySource, MongoSource};
pub use verify::verify_snapshot;
