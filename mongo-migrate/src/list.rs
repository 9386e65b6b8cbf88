//! List the collections of a database

use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

use crate::source::DocumentSource;

/// Write each collection name on its own line, in the order the source
/// reports them. Returns the number of names written.
pub async fn list_collections<S, W>(source: &S, mut out: W) -> Result<usize>
where
    S: DocumentSource,
    W: Write,
{
    let names = source.collection_names().await?;
    debug!("Found {} collections", names.len());

    for name in &names {
        writeln!(out, "{}", name).context("Failed to write collection name")?;
    }
    out.flush().context("Failed to flush output")?;

    Ok(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[tokio::test]
    async fn test_names_one_per_line_in_order() {
        let source = MemorySource::new()
            .with_collection("users", [vec![5u8, 0, 0, 0, 0]])
            .with_collection("grains", Vec::<Vec<u8>>::new())
            .with_collection("apiTokens", Vec::<Vec<u8>>::new());

        let mut out = Vec::new();
        let count = list_collections(&source, &mut out).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "users\ngrains\napiTokens\n");
    }

    #[tokio::test]
    async fn test_empty_database_prints_nothing() {
        let mut out = Vec::new();
        let count = list_collections(&MemorySource::new(), &mut out).await.unwrap();

        assert_eq!(count, 0);
        assert!(out.is_empty());
    }
}
