//! Per-collection snapshot files
//!
//! This module provides the on-disk snapshot format:
//! - Frame layout and errors
//! - SnapshotWriter for dumping one collection
//! - SnapshotReader for reading a dump back

pub mod format;
pub mod reader;
pub mod writer;

pub use format::*;
pub use reader::*;
pub use writer::*;
