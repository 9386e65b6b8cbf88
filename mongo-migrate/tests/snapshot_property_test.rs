//! Property-based tests for the snapshot frame format
//!
//! For any sequence of documents written to a snapshot file, reading the
//! file back frame by frame must return the same documents in the same
//! order, with nothing left over.

use mongo_migrate::snapshot::{read_snapshot_file, SnapshotReader, SnapshotWriter};
use proptest::prelude::*;
use tempfile::TempDir;

/// Strategy for generating opaque documents
fn document_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// Strategy for generating a collection's worth of documents
fn collection_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(document_strategy(), 0..32)
}

proptest! {
    /// Property Test: writing then reading reproduces the documents exactly
    #[test]
    fn prop_snapshot_round_trip(docs in collection_strategy()) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("collection");

        let mut writer = SnapshotWriter::create(&path).unwrap();
        for doc in &docs {
            writer.write_document(doc).unwrap();
        }
        let summary = writer.finish().unwrap();

        let read_back = read_snapshot_file(&path).unwrap();
        prop_assert_eq!(&read_back, &docs);
        prop_assert_eq!(summary.documents, docs.len() as u64);
    }

    /// Property Test: file size is the sum of 4 + len over all documents
    #[test]
    fn prop_snapshot_file_size(docs in collection_strategy()) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("collection");

        let mut writer = SnapshotWriter::create(&path).unwrap();
        for doc in &docs {
            writer.write_document(doc).unwrap();
        }
        writer.finish().unwrap();

        let expected: u64 = docs.iter().map(|d| 4 + d.len() as u64).sum();
        prop_assert_eq!(std::fs::metadata(&path).unwrap().len(), expected);
    }

    /// Property Test: any proper prefix that cuts a frame is reported as
    /// truncated rather than silently accepted
    #[test]
    fn prop_cut_frame_is_an_error(
        docs in prop::collection::vec(document_strategy(), 1..8),
        cut in 1usize..4096,
    ) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("collection");

        let mut writer = SnapshotWriter::create(&path).unwrap();
        for doc in &docs {
            writer.write_document(doc).unwrap();
        }
        writer.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let cut = cut % bytes.len();
        let boundaries: Vec<usize> = docs
            .iter()
            .scan(0usize, |offset, d| {
                *offset += 4 + d.len();
                Some(*offset)
            })
            .collect();
        prop_assume!(cut != 0 && !boundaries.contains(&cut));

        let reader = SnapshotReader::new(&bytes[..cut]);
        let result: Result<Vec<_>, _> = reader.collect();
        prop_assert!(result.is_err());
    }
}
